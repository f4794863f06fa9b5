use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::PushConfig;
use crate::push::{
    BatchOutcome, PushError, PushGateway, PushMessage, ANDROID_PRIORITY, APNS_PRIORITY, APNS_SOUND,
    MULTICAST_LIMIT,
};

/// Push platform client. Single sends and multicasts share one endpoint;
/// a multicast body carries `tokens` instead of `token` and the response
/// reports per-token outcome counts.
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

#[derive(Deserialize)]
struct MulticastResponse {
    success_count: usize,
    failure_count: usize,
}

impl HttpPushGateway {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            server_key: config.server_key.clone(),
        }
    }

    /// Message body plus the fixed per-platform delivery hints: deliver
    /// immediately on android, numeric priority and default alert sound
    /// on apns.
    fn wire_message(message: &PushMessage) -> Value {
        json!({
            "notification": { "title": message.title, "body": message.body },
            "data": message.data,
            "android": { "priority": ANDROID_PRIORITY },
            "apns": {
                "headers": { "apns-priority": APNS_PRIORITY },
                "payload": { "aps": { "sound": APNS_SOUND } },
            },
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        let mut body = Self::wire_message(message);
        body["token"] = json!(token);

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.server_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::Upstream(e.to_string()))?;

        if !res.status().is_success() {
            return Err(PushError::Upstream(format!(
                "send returned {}",
                res.status()
            )));
        }
        Ok(())
    }

    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<BatchOutcome, PushError> {
        if tokens.len() > MULTICAST_LIMIT {
            return Err(PushError::TooManyTokens(tokens.len()));
        }

        let mut body = Self::wire_message(message);
        body["tokens"] = json!(tokens);

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.server_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::Upstream(e.to_string()))?;

        if !res.status().is_success() {
            return Err(PushError::Upstream(format!(
                "multicast returned {}",
                res.status()
            )));
        }

        let outcome: MulticastResponse = res
            .json()
            .await
            .map_err(|e| PushError::Upstream(e.to_string()))?;

        Ok(BatchOutcome {
            success: outcome.success_count,
            failure: outcome.failure_count,
        })
    }
}
