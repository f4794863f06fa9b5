use axum::{extract::Path, Extension, Json};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Caller;
use crate::services::brand::{BrandService, DeleteBrandResponse};

pub async fn delete_brand(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteBrandResponse>, ApiError> {
    let caller = caller.as_ref().map(|c| c.id.as_str());
    let res = BrandService::new(ctx).delete_if_empty(caller, &id).await?;
    Ok(Json(res))
}
