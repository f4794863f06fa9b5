pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Claim map attached to an identity-provider account. Holds at least
/// `role`; unrelated keys belong to other systems and must survive updates.
pub type ClaimMap = HashMap<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("identity provider request failed: {0}")]
    Upstream(String),
}

/// External identity provider: account lifecycle plus authorization claims.
/// Claim writes are the expensive, rate-limited operation on this seam.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account with an unverified email; returns the new id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    async fn delete_account(&self, id: &str) -> Result<(), IdentityError>;

    async fn claims(&self, id: &str) -> Result<ClaimMap, IdentityError>;

    /// Replace the account's claim map wholesale. Callers that must keep
    /// unrelated keys read-merge-write through `claims`.
    async fn set_claims(&self, id: &str, claims: ClaimMap) -> Result<(), IdentityError>;
}

/// Set the `role` claim to `role`, preserving every other claim key.
///
/// Skips the write when the claim already matches and returns false; this
/// no-op detection is what keeps the role synchronizer from hammering the
/// rate-limited claim endpoint on redundant profile writes.
pub async fn merge_role_claim(
    identity: &dyn IdentityProvider,
    id: &str,
    role: crate::auth::Role,
) -> Result<bool, IdentityError> {
    let mut claims = identity.claims(id).await?;

    if claims.get("role").and_then(Value::as_str) == Some(role.as_str()) {
        return Ok(false);
    }

    claims.insert("role".to_string(), Value::String(role.as_str().to_string()));
    identity.set_claims(id, claims).await?;
    Ok(true)
}
