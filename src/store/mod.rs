pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// User profile document. `role` is also mirrored into the identity
/// provider's authorization claim by the role claim synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub push_token: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of the transactional half of brand deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandDeletion {
    Deleted,
    /// Nothing to delete; treated as success by the caller.
    AlreadyAbsent,
    /// A post referencing the brand appeared since the optimistic pre-check.
    HasPosts,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError>;

    async fn insert(&self, profile: &Profile) -> Result<(), StoreError>;

    async fn update_role(&self, id: &str, role: Role) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Projection over the push-token column only; never loads full
    /// profiles. Empty and null tokens are filtered out.
    async fn push_tokens(&self) -> Result<Vec<String>, StoreError>;
}

/// Brands and their posts. Post rows are written by external authoring
/// flows; this store reads them for counts and maintains the denormalized
/// `post_count` on the brand row.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Live count of posts referencing the brand - the source of truth the
    /// denormalized counter approximates.
    async fn post_count(&self, brand_id: &str) -> Result<i64, StoreError>;

    /// Atomically apply a `post_count` delta. `create_if_missing` gives
    /// merge semantics (the brand row need not pre-exist); without it a
    /// missing brand row is a silent no-op. The delta is keyed by
    /// `event_id` so a re-delivered event applies nothing; returns false
    /// when the (event, brand) pair was already applied.
    async fn apply_post_delta(
        &self,
        brand_id: &str,
        delta: i64,
        event_id: Uuid,
        create_if_missing: bool,
    ) -> Result<bool, StoreError>;

    /// Denormalized counter value, if the brand row exists.
    async fn brand_post_count(&self, brand_id: &str) -> Result<Option<i64>, StoreError>;

    /// Transactional half of safe brand deletion: re-read the brand row,
    /// re-run the post count inside the transaction, and delete only if
    /// the count is still zero.
    async fn delete_brand_if_empty(&self, brand_id: &str) -> Result<BrandDeletion, StoreError>;
}
