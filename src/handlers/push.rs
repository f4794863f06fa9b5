use axum::{Extension, Json};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Caller;
use crate::services::push::{BroadcastRequest, BroadcastResponse, PushService, SendTestRequest};
use crate::services::OkResponse;

pub async fn send_test(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(req): Json<SendTestRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let caller = caller.as_ref().map(|c| c.id.as_str());
    let res = PushService::new(ctx).send_test(caller, req).await?;
    Ok(Json(res))
}

pub async fn broadcast_all(
    Extension(ctx): Extension<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let caller = caller.as_ref().map(|c| c.id.as_str());
    let res = PushService::new(ctx).broadcast_all(caller, req).await?;
    Ok(Json(res))
}
