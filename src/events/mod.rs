pub mod brand_counter;
pub mod role_sync;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::AppContext;

/// One change notification from the document store's feed.
///
/// Delivery is at-least-once and unordered across documents; `id` is the
/// feed's event identifier and keys the counter handlers' dedup ledger.
/// Documents travel as raw JSON, exactly as stored - handlers own the
/// defensive reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    ProfileUpdated {
        profile_id: String,
        after: Value,
    },
    PostCreated {
        post_id: String,
        doc: Value,
    },
    PostUpdated {
        post_id: String,
        before: Value,
        after: Value,
    },
    PostDeleted {
        post_id: String,
        doc: Value,
    },
}

/// Route one event to its handler.
///
/// Handlers are best-effort by design: a failure is recorded and dropped,
/// never propagated, so a poisoned event cannot wedge the feed with
/// retries that would amplify counter skew.
pub async fn dispatch(ctx: AppContext, event: ChangeEvent) {
    let event_id = event.id;

    let result: Result<(), Box<dyn std::error::Error + Send + Sync>> = match event.kind {
        ChangeKind::ProfileUpdated { profile_id, after } => {
            role_sync::on_profile_updated(&ctx, &profile_id, &after)
                .await
                .map_err(Into::into)
        }
        ChangeKind::PostCreated { post_id, doc } => {
            brand_counter::on_post_created(&ctx, event_id, &post_id, &doc)
                .await
                .map_err(Into::into)
        }
        ChangeKind::PostUpdated {
            post_id,
            before,
            after,
        } => brand_counter::on_post_updated(&ctx, event_id, &post_id, &before, &after)
            .await
            .map_err(Into::into),
        ChangeKind::PostDeleted { post_id, doc } => {
            brand_counter::on_post_deleted(&ctx, event_id, &post_id, &doc)
                .await
                .map_err(Into::into)
        }
    };

    if let Err(e) = result {
        tracing::warn!(event = %event_id, "event handler failed: {}", e);
    }
}

/// Pull the brand reference out of a raw post document.
fn brand_ref(doc: &Value) -> Option<&str> {
    doc.get("brand_id").and_then(Value::as_str).filter(|s| !s.is_empty())
}
