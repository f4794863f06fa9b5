pub mod admin;
pub mod brand;
pub mod events;
pub mod push;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::AppContext;
use crate::middleware::auth::caller_identity_middleware;
use crate::store::ProfileStore;

/// Assemble the full router. Tests drive this in-process; `main` serves it.
pub fn app(ctx: AppContext, jwt_secret: String) -> Router {
    Router::new()
        // Public
        .route("/", get(index))
        .route("/health", get(health))
        // Gated request/response operations
        .route("/api/admin/users", post(admin::create_user))
        .route("/api/admin/users/:id", delete(admin::delete_user))
        .route("/api/admin/users/:id/role", put(admin::set_role))
        .route("/api/push/test", post(push::send_test))
        .route("/api/push/broadcast", post(push::broadcast_all))
        .route("/api/brands/:id", delete(brand::delete_brand))
        // Change-feed delivery (store-internal, not caller-facing)
        .route("/internal/events", post(events::ingest_event))
        // Global middleware
        .layer(from_fn_with_state(jwt_secret, caller_identity_middleware))
        .layer(Extension(ctx))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Brandboard API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "admin": "/api/admin/users[/:id[/role]] (super)",
                "push": "/api/push/test (admin), /api/push/broadcast (super)",
                "brands": "/api/brands/:id (admin)",
                "events": "/internal/events (change feed delivery)",
            }
        }
    }))
}

async fn health(Extension(ctx): Extension<AppContext>) -> Json<Value> {
    let now = chrono::Utc::now();

    // A cheap point read proves the profile store is reachable
    match ctx.profiles.get("__health__").await {
        Ok(_) => Json(json!({
            "success": true,
            "data": { "status": "ok", "timestamp": now }
        })),
        Err(e) => Json(json!({
            "success": false,
            "error": "store unavailable",
            "data": { "status": "degraded", "timestamp": now, "store_error": e.to_string() }
        })),
    }
}
