//! Recording push gateway for tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::push::{BatchOutcome, PushError, PushGateway, PushMessage, MULTICAST_LIMIT};

/// Records every call. Tokens prefixed `bad-` count as delivery failures,
/// which lets tests drive partial-failure accounting.
#[derive(Default)]
pub struct MemoryPushGateway {
    sends: Mutex<Vec<(String, PushMessage)>>,
    chunk_sizes: Mutex<Vec<usize>>,
}

impl MemoryPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sends.lock().unwrap().clone()
    }

    /// Sizes of each multicast call, in order of issue.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for MemoryPushGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        self.sends
            .lock()
            .unwrap()
            .push((token.to_string(), message.clone()));
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

        self.chunk_sizes.lock().unwrap().push(tokens.len());

        let mut outcome = BatchOutcome::default();
        let mut sends = self.sends.lock().unwrap();
        for token in tokens {
            if token.starts_with("bad-") {
                outcome.failure += 1;
            } else {
                outcome.success += 1;
                sends.push((token.clone(), message.clone()));
            }
        }
        Ok(outcome)
    }
}
