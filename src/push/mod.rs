pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum recipients the push platform accepts in one multicast call.
pub const MULTICAST_LIMIT: usize = 500;

// Platform delivery hints carried on every message
pub const ANDROID_PRIORITY: &str = "high";
pub const APNS_PRIORITY: &str = "10";
pub const APNS_SOUND: &str = "default";

/// Notification payload. Delivery hints are fixed per platform and applied
/// by the gateway when it builds the wire request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// Per-call fan-out accounting. The platform reports per-token outcomes;
/// a failed token never fails the call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: usize,
    pub failure: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push platform request failed: {0}")]
    Upstream(String),
    #[error("multicast over {0} tokens exceeds the {MULTICAST_LIMIT}-token limit")]
    TooManyTokens(usize),
}

#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError>;

    /// One fan-out call; `tokens` must not exceed `MULTICAST_LIMIT`.
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<BatchOutcome, PushError>;
}
