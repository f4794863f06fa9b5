use std::sync::Arc;

use crate::identity::IdentityProvider;
use crate::push::PushGateway;
use crate::store::{CatalogStore, ProfileStore};

/// Handles to every external collaborator, constructed once at startup and
/// passed into services and event handlers. There is no process-wide store
/// singleton; tests substitute the in-memory implementations here.
#[derive(Clone)]
pub struct AppContext {
    pub profiles: Arc<dyn ProfileStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub push: Arc<dyn PushGateway>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl AppContext {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityProvider>,
        push: Arc<dyn PushGateway>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            profiles,
            identity,
            push,
            catalog,
        }
    }
}
