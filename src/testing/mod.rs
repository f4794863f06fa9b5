//! Test fixtures over the in-memory substitute stores.

use chrono::Utc;
use std::sync::Arc;

use crate::auth::Role;
use crate::context::AppContext;
use crate::identity::memory::MemoryIdentityProvider;
use crate::push::memory::MemoryPushGateway;
use crate::store::memory::{MemoryCatalogStore, MemoryProfileStore};
use crate::store::{Profile, ProfileStore};

/// An `AppContext` over memory implementations, with concrete handles kept
/// so tests can seed state and assert on recorded calls.
pub struct TestContext {
    pub ctx: AppContext,
    pub profiles: Arc<MemoryProfileStore>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub push: Arc<MemoryPushGateway>,
    pub catalog: Arc<MemoryCatalogStore>,
}

impl TestContext {
    pub fn new() -> Self {
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

        Self {
            ctx,
            profiles,
            identity,
            push,
            catalog,
        }
    }

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
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
