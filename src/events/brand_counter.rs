//! Denormalized brand post counter.
//!
//! Three handlers over post lifecycle events keep `brands.post_count`
//! converging on the live post count. Every delta is commutative and
//! atomic, so concurrent events never lose updates to each other, and
//! every delta is keyed by the feed's event id, so at-least-once delivery
//! applies each one exactly once.

use serde_json::Value;
use uuid::Uuid;

use crate::context::AppContext;
use crate::events::brand_ref;
use crate::store::{CatalogStore, StoreError};

/// Post created: +1 on its brand, creating the brand row if absent.
pub async fn on_post_created(
    ctx: &AppContext,
    event_id: Uuid,
    post_id: &str,
    doc: &Value,
) -> Result<(), StoreError> {
    let Some(brand_id) = brand_ref(doc) else {
        // No brand reference, nothing to count
        return Ok(());
    };

    let applied = ctx
        .catalog
        .apply_post_delta(brand_id, 1, event_id, true)
        .await?;
    if !applied {
        tracing::debug!(event = %event_id, post = %post_id, "duplicate create event skipped");
    }
    Ok(())
}

/// Post deleted: -1 on its brand. An absent brand row and a failed
/// decrement are both swallowed; the counter must never block deletion
/// flows, and a retry here would only widen the skew.
pub async fn on_post_deleted(
    ctx: &AppContext,
    event_id: Uuid,
    post_id: &str,
    doc: &Value,
) -> Result<(), StoreError> {
    let Some(brand_id) = brand_ref(doc) else {
        return Ok(());
    };

    if let Err(e) = ctx
        .catalog
        .apply_post_delta(brand_id, -1, event_id, false)
        .await
    {
        tracing::warn!(
            event = %event_id,
            post = %post_id,
            brand = %brand_id,
            "best-effort decrement failed: {}",
            e
        );
    }
    Ok(())
}

/// Post updated: only a re-parenting matters. When both sides carry a
/// brand and they differ, the old brand loses one (swallowed if its row is
/// gone) and the new brand gains one with merge semantics. The two deltas
/// dedup independently per (event, brand).
pub async fn on_post_updated(
    ctx: &AppContext,
    event_id: Uuid,
    post_id: &str,
    before: &Value,
    after: &Value,
) -> Result<(), StoreError> {
    let (Some(old_brand), Some(new_brand)) = (brand_ref(before), brand_ref(after)) else {
        return Ok(());
    };
    if old_brand == new_brand {
        return Ok(());
    }

    if let Err(e) = ctx
        .catalog
        .apply_post_delta(old_brand, -1, event_id, false)
        .await
    {
        tracing::warn!(
            event = %event_id,
            post = %post_id,
            brand = %old_brand,
            "best-effort decrement failed: {}",
            e
        );
    }

    ctx.catalog
        .apply_post_delta(new_brand, 1, event_id, true)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;
    use crate::testing::TestContext;
    use serde_json::json;

    fn post(brand: &str) -> Value {
        json!({ "brand_id": brand })
    }

    #[tokio::test]
    async fn counter_converges_to_creates_minus_deletes() {
        let tc = TestContext::new();
        let n = 5;
        let m = 2;

        for i in 0..n {
            on_post_created(&tc.ctx, Uuid::new_v4(), &format!("p{}", i), &post("b1"))
                .await
                .unwrap();
        }
        for i in 0..m {
            on_post_deleted(&tc.ctx, Uuid::new_v4(), &format!("p{}", i), &post("b1"))
                .await
                .unwrap();
        }

        assert_eq!(
            tc.ctx.catalog.brand_post_count("b1").await.unwrap(),
            Some((n - m) as i64)
        );
    }

    #[tokio::test]
    async fn duplicate_delivery_changes_nothing() {
        let tc = TestContext::new();
        let event = Uuid::new_v4();

        on_post_created(&tc.ctx, event, "p1", &post("b1")).await.unwrap();
        on_post_created(&tc.ctx, event, "p1", &post("b1")).await.unwrap();
        on_post_created(&tc.ctx, event, "p1", &post("b1")).await.unwrap();

        assert_eq!(tc.ctx.catalog.brand_post_count("b1").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn missing_brand_reference_is_a_silent_no_op() {
        let tc = TestContext::new();

        on_post_created(&tc.ctx, Uuid::new_v4(), "p1", &json!({ "title": "draft" }))
            .await
            .unwrap();
        on_post_deleted(&tc.ctx, Uuid::new_v4(), "p1", &json!({}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_for_a_vanished_brand_is_swallowed() {
        let tc = TestContext::new();

        // Brand row was never created; the decrement simply disappears
        on_post_deleted(&tc.ctx, Uuid::new_v4(), "p1", &post("ghost"))
            .await
            .unwrap();
        assert_eq!(tc.ctx.catalog.brand_post_count("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reparenting_moves_one_count() {
        let tc = TestContext::new();

        on_post_created(&tc.ctx, Uuid::new_v4(), "p1", &post("b1"))
            .await
            .unwrap();

        on_post_updated(
            &tc.ctx,
            Uuid::new_v4(),
            "p1",
            &post("b1"),
            &post("b2"),
        )
        .await
        .unwrap();

        assert_eq!(tc.ctx.catalog.brand_post_count("b1").await.unwrap(), Some(0));
        // b2 is created by merge semantics
        assert_eq!(tc.ctx.catalog.brand_post_count("b2").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn update_without_reparenting_is_ignored() {
        let tc = TestContext::new();

        on_post_created(&tc.ctx, Uuid::new_v4(), "p1", &post("b1"))
            .await
            .unwrap();
        on_post_updated(
            &tc.ctx,
            Uuid::new_v4(),
            "p1",
            &json!({ "brand_id": "b1", "title": "old" }),
            &json!({ "brand_id": "b1", "title": "new" }),
        )
        .await
        .unwrap();

        assert_eq!(tc.ctx.catalog.brand_post_count("b1").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn update_missing_either_side_is_ignored() {
        let tc = TestContext::new();

        on_post_updated(&tc.ctx, Uuid::new_v4(), "p1", &json!({}), &post("b2"))
            .await
            .unwrap();
        on_post_updated(&tc.ctx, Uuid::new_v4(), "p1", &post("b1"), &json!({}))
            .await
            .unwrap();

        assert_eq!(tc.ctx.catalog.brand_post_count("b1").await.unwrap(), None);
        assert_eq!(tc.ctx.catalog.brand_post_count("b2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn interleaved_deletes_never_drive_the_count_negative() {
        let tc = TestContext::new();

        for i in 0..3 {
            on_post_created(&tc.ctx, Uuid::new_v4(), &format!("p{}", i), &post("b1"))
                .await
                .unwrap();
            on_post_deleted(&tc.ctx, Uuid::new_v4(), &format!("p{}", i), &post("b1"))
                .await
                .unwrap();
        }

        assert_eq!(tc.ctx.catalog.brand_post_count("b1").await.unwrap(), Some(0));
    }
}
