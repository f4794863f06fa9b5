use serde::Serialize;

use crate::auth::Role;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::services::guard::require_role;
use crate::store::{BrandDeletion, CatalogStore};

#[derive(Debug, Serialize)]
pub struct DeleteBrandResponse {
    pub ok: bool,
    pub message: String,
}

pub struct BrandService {
    ctx: AppContext,
}

impl BrandService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Delete a brand only while it has no posts.
    ///
    /// Phase 1 is a cheap optimistic count outside any transaction,
    /// rejecting the common non-empty case early. Phase 2 re-reads the
    /// brand row and re-counts inside a transaction, so a post created
    /// between the two checks still aborts the delete. The denormalized
    /// `post_count` on the brand row is never consulted here; only the
    /// live post rows are authoritative.
    pub async fn delete_if_empty(
        &self,
        caller: Option<&str>,
        brand_id: &str,
    ) -> Result<DeleteBrandResponse, ApiError> {
        let caller = require_role(&self.ctx, caller, Role::Admin).await?;

        if brand_id.is_empty() {
            return Err(ApiError::invalid_argument("brand_id is required"));
        }

        let live = self.ctx.catalog.post_count(brand_id).await?;
        if live > 0 {
            return Err(ApiError::failed_precondition(
                "brand still has posts and cannot be deleted",
            ));
        }

        match self.ctx.catalog.delete_brand_if_empty(brand_id).await? {
            BrandDeletion::HasPosts => Err(ApiError::failed_precondition(
                "a post was created while the brand was being deleted",
            )),
            BrandDeletion::Deleted | BrandDeletion::AlreadyAbsent => {
                tracing::info!(brand = %brand_id, deleted_by = %caller, "brand deleted");
                Ok(DeleteBrandResponse {
                    ok: true,
                    message: "brand deleted".to_string(),
                })
            }
        }
    }
}
