use axum::{extract::Path, Extension, Json};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Caller;
use crate::services::user_admin::{
    CreateUserRequest, CreateUserResponse, SetRoleRequest, UserAdminService,
};
use crate::services::OkResponse;

fn caller_id(caller: &Option<Extension<Caller>>) -> Option<&str> {
    caller.as_ref().map(|c| c.id.as_str())
}

pub async fn create_user(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let res = UserAdminService::new(ctx)
        .create_user(caller_id(&caller), req)
        .await?;
    Ok(Json(res))
}

pub async fn delete_user(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    let res = UserAdminService::new(ctx)
        .delete_user(caller_id(&caller), &id)
        .await?;
    Ok(Json(res))
}

pub async fn set_role(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let res = UserAdminService::new(ctx)
        .set_role(caller_id(&caller), &id, req)
        .await?;
    Ok(Json(res))
}
