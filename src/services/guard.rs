use crate::auth::Role;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::store::ProfileStore;

/// The single capability check every gated operation runs first.
///
/// Resolves the caller's role from the profile store, not from token
/// claims, so a just-changed role takes effect without waiting for a token
/// refresh. No caller identity fails `Unauthenticated`; a caller with no
/// profile document acts as guest and satisfies no minimum. Pure predicate,
/// no side effects.
pub async fn require_role(
    ctx: &AppContext,
    caller: Option<&str>,
    minimum: Role,
) -> Result<String, ApiError> {
    let caller = caller.ok_or_else(|| ApiError::unauthenticated("sign-in required"))?;

    let role = ctx.profiles.get(caller).await?.map(|p| p.role);

    match role {
        Some(role) if role.satisfies(minimum) => Ok(caller.to_string()),
        _ => Err(ApiError::permission_denied(format!(
            "requires the {} role",
            minimum
        ))),
    }
}
