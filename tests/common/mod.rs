use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use brandboard_api::auth::{self, Claims, Role};
use brandboard_api::context::AppContext;
use brandboard_api::handlers;
use brandboard_api::identity::memory::MemoryIdentityProvider;
use brandboard_api::push::memory::MemoryPushGateway;
use brandboard_api::store::memory::{MemoryCatalogStore, MemoryProfileStore};
use brandboard_api::store::{Profile, ProfileStore};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Router over memory stores, plus the handles the tests assert against.
pub struct TestApp {
    pub app: Router,
    pub profiles: Arc<MemoryProfileStore>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub push: Arc<MemoryPushGateway>,
    pub catalog: Arc<MemoryCatalogStore>,
}

pub fn test_app() -> TestApp {
    let profiles = Arc::new(MemoryProfileStore::new());
    let identity = Arc::new(MemoryIdentityProvider::new());
    let push = Arc::new(MemoryPushGateway::new());
    let catalog = Arc::new(MemoryCatalogStore::new());

    let ctx = AppContext::new(
        profiles.clone(),
        identity.clone(),
        push.clone(),
        catalog.clone(),
    );

    TestApp {
        app: handlers::app(ctx, JWT_SECRET.to_string()),
        profiles,
        identity,
        push,
        catalog,
    }
}

impl TestApp {
    pub async fn seed_profile(&self, id: &str, role: Role, push_token: Option<&str>) {
        self.profiles
            .insert(&Profile {
                id: id.to_string(),
                email: format!("{}@example.com", id),
                role,
                push_token: push_token.map(str::to_string),
                created_by: "seed".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("memory store insert");
    }

    pub fn bearer(&self, uid: &str) -> String {
        let token = auth::generate_jwt(&Claims::new(uid, 1), JWT_SECRET).expect("jwt");
        format!("Bearer {}", token)
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        caller: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = caller {
            builder = builder.header(header::AUTHORIZATION, self.bearer(uid));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().oneshot(request).await.expect("request")
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
