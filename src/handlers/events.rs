use axum::{http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::events::{self, ChangeEvent};

/// Change-feed delivery endpoint.
///
/// The store's notification mechanism POSTs one event per request. The
/// handler acknowledges immediately and dispatches on a spawned task - no
/// deliverer ever waits on handler completion, and nothing orders two
/// events against each other.
pub async fn ingest_event(
    Extension(ctx): Extension<AppContext>,
    Json(event): Json<ChangeEvent>,
) -> (StatusCode, Json<Value>) {
    let event_id = event.id;
    tokio::spawn(events::dispatch(ctx, event));

    (
        StatusCode::ACCEPTED,
        Json(json!({ "accepted": true, "event": event_id })),
    )
}
