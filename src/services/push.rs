use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::Role;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::push::{PushGateway, PushMessage, MULTICAST_LIMIT};
use crate::services::guard::require_role;
use crate::services::OkResponse;
use crate::store::ProfileStore;

const TEST_TITLE: &str = "Test notification";
const TEST_BODY: &str = "If you can read this, push delivery works.";
const BROADCAST_TITLE: &str = "Announcement";
const BROADCAST_BODY: &str = "Something new has arrived.";

#[derive(Debug, Deserialize)]
pub struct SendTestRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

/// Aggregate fan-out accounting. Partial delivery failure is reported
/// here, never raised as an error; callers inspect the counts.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
}

pub struct PushService {
    ctx: AppContext,
}

impl PushService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Send a single diagnostic push to one user's registered token.
    pub async fn send_test(
        &self,
        caller: Option<&str>,
        req: SendTestRequest,
    ) -> Result<OkResponse, ApiError> {
        require_role(&self.ctx, caller, Role::Admin).await?;

        let id = req
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::invalid_argument("id is required"))?;

        let profile = self.ctx.profiles.get(&id).await?;
        let token = profile
            .and_then(|p| p.push_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::failed_precondition("this user has no registered push token")
            })?;

        let message = PushMessage {
            title: req.title.unwrap_or_else(|| TEST_TITLE.to_string()),
            body: req.body.unwrap_or_else(|| TEST_BODY.to_string()),
            data: HashMap::new(),
        };

        self.ctx.push.send(&token, &message).await?;

        tracing::info!(account = %id, "test push sent");
        Ok(OkResponse { ok: true })
    }

    /// Broadcast to every registered token in platform-bounded chunks.
    ///
    /// Chunks go out sequentially: failure accounting stays trivial and
    /// chunk sends never race each other, at the cost of latency linear in
    /// the token count. A chunk-level transport failure counts the whole
    /// chunk as failures and the loop continues, so
    /// `success + failure == total` always holds.
    pub async fn broadcast_all(
        &self,
        caller: Option<&str>,
        req: BroadcastRequest,
    ) -> Result<BroadcastResponse, ApiError> {
        require_role(&self.ctx, caller, Role::Super).await?;

        let tokens = self.ctx.profiles.push_tokens().await?;
        if tokens.is_empty() {
            return Err(ApiError::failed_precondition("no push tokens to send to"));
        }

        let mut data = HashMap::from([("type".to_string(), "broadcast".to_string())]);
        if let Some(extra) = req.data {
            data.extend(extra);
        }

        let message = PushMessage {
            title: req.title.unwrap_or_else(|| BROADCAST_TITLE.to_string()),
            body: req.body.unwrap_or_else(|| BROADCAST_BODY.to_string()),
            data,
        };

        let total = tokens.len();
        let mut success = 0;
        let mut failure = 0;

        for chunk in tokens.chunks(MULTICAST_LIMIT) {
            match self.ctx.push.send_multicast(chunk, &message).await {
                Ok(outcome) => {
                    success += outcome.success;
                    failure += outcome.failure;
                }
                Err(e) => {
                    tracing::warn!("multicast chunk of {} failed: {}", chunk.len(), e);
                    failure += chunk.len();
                }
            }
        }

        tracing::info!(total, success, failure, "broadcast complete");
        Ok(BroadcastResponse {
            total,
            success,
            failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::{BatchOutcome, PushError};
    use crate::testing::TestContext;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn broadcast_req() -> BroadcastRequest {
        BroadcastRequest {
            title: None,
            body: None,
            data: None,
        }
    }

    #[tokio::test]
    async fn send_test_requires_id() {
        let tc = TestContext::new();
        tc.seed_profile("a1", Role::Admin, None).await;
        let service = PushService::new(tc.ctx.clone());

        let err = service
            .send_test(
                Some("a1"),
                SendTestRequest {
                    id: None,
                    title: None,
                    body: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn send_test_requires_a_registered_token() {
        let tc = TestContext::new();
        tc.seed_profile("a1", Role::Admin, None).await;
        tc.seed_profile("u1", Role::User, None).await;
        let service = PushService::new(tc.ctx.clone());

        let err = service
            .send_test(
                Some("a1"),
                SendTestRequest {
                    id: Some("u1".to_string()),
                    title: None,
                    body: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FAILED_PRECONDITION");
    }

    #[tokio::test]
    async fn send_test_uses_defaults_when_omitted() {
        let tc = TestContext::new();
        tc.seed_profile("a1", Role::Admin, None).await;
        tc.seed_profile("u1", Role::User, Some("tok-1")).await;
        let service = PushService::new(tc.ctx.clone());

        service
            .send_test(
                Some("a1"),
                SendTestRequest {
                    id: Some("u1".to_string()),
                    title: None,
                    body: None,
                },
            )
            .await
            .unwrap();

        let sent = tc.push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok-1");
        assert_eq!(sent[0].1.title, TEST_TITLE);
        assert_eq!(sent[0].1.body, TEST_BODY);
    }

    #[tokio::test]
    async fn broadcast_is_gated_to_super() {
        let tc = TestContext::new();
        tc.seed_profile("a1", Role::Admin, Some("tok-a1")).await;
        let service = PushService::new(tc.ctx.clone());

        let err = service
            .broadcast_all(Some("a1"), broadcast_req())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn broadcast_with_no_tokens_fails_precondition() {
        let tc = TestContext::new();
        tc.seed_profile("root", Role::Super, None).await;
        let service = PushService::new(tc.ctx.clone());

        let err = service
            .broadcast_all(Some("root"), broadcast_req())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FAILED_PRECONDITION");
    }

    #[tokio::test]
    async fn broadcast_chunks_at_the_platform_limit() {
        let tc = TestContext::new();
        tc.seed_profile("root", Role::Super, None).await;
        for i in 0..1200 {
            tc.seed_profile(&format!("u{}", i), Role::User, Some(&format!("tok-{}", i)))
                .await;
        }
        let service = PushService::new(tc.ctx.clone());

        let res = service
            .broadcast_all(Some("root"), broadcast_req())
            .await
            .unwrap();

        assert_eq!(res.total, 1200);
        assert_eq!(res.success + res.failure, 1200);

        let mut chunks = tc.push.chunk_sizes();
        chunks.sort_unstable();
        assert_eq!(chunks, vec![200, 500, 500]);
    }

    #[tokio::test]
    async fn broadcast_accounts_partial_failures_without_erroring() {
        let tc = TestContext::new();
        tc.seed_profile("root", Role::Super, None).await;
        for i in 0..10 {
            tc.seed_profile(&format!("u{}", i), Role::User, Some(&format!("tok-{}", i)))
                .await;
        }
        for i in 0..3 {
            tc.seed_profile(&format!("b{}", i), Role::User, Some(&format!("bad-{}", i)))
                .await;
        }
        let service = PushService::new(tc.ctx.clone());

        let res = service
            .broadcast_all(Some("root"), broadcast_req())
            .await
            .unwrap();

        assert_eq!(res.total, 13);
        assert_eq!(res.success, 10);
        assert_eq!(res.failure, 3);
    }

    /// Gateway double whose first multicast call dies at the transport
    /// level; later calls deliver everything.
    struct FlakyGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PushGateway for FlakyGateway {
        async fn send(&self, _token: &str, _message: &PushMessage) -> Result<(), PushError> {
            Ok(())
        }

        async fn send_multicast(
            &self,
            tokens: &[String],
            _message: &PushMessage,
        ) -> Result<BatchOutcome, PushError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(PushError::Upstream("connection reset".to_string()));
            }
            Ok(BatchOutcome {
                success: tokens.len(),
                failure: 0,
            })
        }
    }

    #[tokio::test]
    async fn failed_chunk_is_fully_counted_and_the_loop_continues() {
        let tc = TestContext::new();
        tc.seed_profile("root", Role::Super, None).await;
        for i in 0..600 {
            tc.seed_profile(&format!("u{}", i), Role::User, Some(&format!("tok-{}", i)))
                .await;
        }

        let gateway = Arc::new(FlakyGateway {
            calls: AtomicUsize::new(0),
        });
        let ctx = AppContext::new(
            tc.ctx.profiles.clone(),
            tc.ctx.identity.clone(),
            gateway.clone(),
            tc.ctx.catalog.clone(),
        );
        let service = PushService::new(ctx);

        let res = service
            .broadcast_all(Some("root"), broadcast_req())
            .await
            .unwrap();

        // First chunk of 500 died on the wire and counts entirely as
        // failures; the trailing chunk of 100 still went out
        assert_eq!(res.total, 600);
        assert_eq!(res.failure, 500);
        assert_eq!(res.success, 100);
        assert_eq!(res.success + res.failure, res.total);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn broadcast_data_merges_over_the_broadcast_type() {
        let tc = TestContext::new();
        tc.seed_profile("root", Role::Super, None).await;
        tc.seed_profile("u1", Role::User, Some("tok-1")).await;
        let service = PushService::new(tc.ctx.clone());

        service
            .broadcast_all(
                Some("root"),
                BroadcastRequest {
                    title: Some("Release".to_string()),
                    body: None,
                    data: Some(HashMap::from([(
                        "deep_link".to_string(),
                        "brand/42".to_string(),
                    )])),
                },
            )
            .await
            .unwrap();

        let sent = tc.push.sent();
        assert_eq!(sent.len(), 1);
        let message = &sent[0].1;
        assert_eq!(message.title, "Release");
        assert_eq!(message.data.get("type").map(String::as_str), Some("broadcast"));
        assert_eq!(
            message.data.get("deep_link").map(String::as_str),
            Some("brand/42")
        );
    }
}
