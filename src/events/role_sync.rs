//! Role claim synchronizer.
//!
//! The only consistency mechanism between the profile store and the
//! authorization layer, and it is eventual: a token issued before this
//! handler runs carries the stale role until the client refreshes it.

use serde_json::Value;

use crate::auth::Role;
use crate::context::AppContext;
use crate::identity::{self, IdentityError};

/// Mirror the post-update profile role into the identity provider's
/// `role` claim.
///
/// The stored role is read defensively: lower-cased, and anything outside
/// {admin, super} collapses to user, so a malformed write can never grant
/// an elevated claim. Unrelated claim keys survive, and an already-matching
/// claim issues no write at all.
pub async fn on_profile_updated(
    ctx: &AppContext,
    profile_id: &str,
    after: &Value,
) -> Result<(), IdentityError> {
    let raw = after.get("role").and_then(Value::as_str).unwrap_or("user");
    let role = Role::normalize(raw);

    let wrote = identity::merge_role_claim(ctx.identity.as_ref(), profile_id, role).await?;
    if wrote {
        tracing::info!(account = %profile_id, role = %role, "role claim synchronized");
    }
    Ok(())
}
