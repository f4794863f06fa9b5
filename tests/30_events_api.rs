mod common;

use axum::http::StatusCode;
use brandboard_api::auth::Role;
use brandboard_api::store::CatalogStore;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// Dispatch is spawned, so give it a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn post_create_event_increments_the_brand_counter() {
    let app = common::test_app();

    let res = app
        .request(
            "POST",
            "/internal/events",
            None,
            Some(json!({
                "id": Uuid::new_v4(),
                "type": "post_created",
                "post_id": "p1",
                "doc": { "brand_id": "b1" },
            })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    settle().await;
    assert_eq!(app.catalog.brand_post_count("b1").await.unwrap(), Some(1));
}

#[tokio::test]
async fn redelivered_event_is_ignored() {
    let app = common::test_app();
    let event = json!({
        "id": Uuid::new_v4(),
        "type": "post_created",
        "post_id": "p1",
        "doc": { "brand_id": "b1" },
    });

    for _ in 0..3 {
        let res = app
            .request("POST", "/internal/events", None, Some(event.clone()))
            .await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    settle().await;
    assert_eq!(app.catalog.brand_post_count("b1").await.unwrap(), Some(1));
}

#[tokio::test]
async fn profile_update_event_syncs_the_role_claim() {
    let app = common::test_app();
    app.identity.seed_account("u1", "u1@example.com");

    let res = app
        .request(
            "POST",
            "/internal/events",
            None,
            Some(json!({
                "id": Uuid::new_v4(),
                "type": "profile_updated",
                "profile_id": "u1",
                "after": { "role": "admin" },
            })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    settle().await;
    let claims = app.identity.account("u1").expect("account").claims;
    assert_eq!(claims.get("role"), Some(&json!("admin")));
}

#[tokio::test]
async fn brand_deletion_rejects_while_posts_exist() {
    let app = common::test_app();
    app.seed_profile("a1", Role::Admin, None).await;
    app.catalog.insert_brand("b1", 1);
    app.catalog.insert_post("p1", "b1");

    let res = app.request("DELETE", "/api/brands/b1", Some("a1"), None).await;
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    app.catalog.remove_post("p1");
    let res = app.request("DELETE", "/api/brands/b1", Some("a1"), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::json_body(res).await;
    assert_eq!(body["ok"], true);
}
