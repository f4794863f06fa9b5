use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::identity::{self, IdentityError, IdentityProvider};
use crate::services::guard::require_role;
use crate::services::OkResponse;
use crate::store::{Profile, ProfileStore};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Option<String>,
}

/// Validated create-user input. Role normalizes to admin only on an
/// explicit request; super can never be granted through this path.
struct NewUser {
    email: String,
    password: String,
    role: Role,
}

fn validate_create(req: CreateUserRequest) -> Result<NewUser, ApiError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::invalid_argument("email is required"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::invalid_argument("password is required"))?;

    let role = if req.role.as_deref() == Some("admin") {
        Role::Admin
    } else {
        Role::User
    };

    Ok(NewUser {
        email,
        password,
        role,
    })
}

fn validate_id(id: &str) -> Result<(), ApiError> {
    if id.is_empty() {
        return Err(ApiError::invalid_argument("id is required"));
    }
    Ok(())
}

pub struct UserAdminService {
    ctx: AppContext,
}

impl UserAdminService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Create an identity account, set its role claim, write the profile.
    ///
    /// The three steps are not transactional. A failure after account
    /// creation leaves an orphaned identity with no profile; that id is
    /// logged for the reconciliation sweep and the error is surfaced.
    pub async fn create_user(
        &self,
        caller: Option<&str>,
        req: CreateUserRequest,
    ) -> Result<CreateUserResponse, ApiError> {
        let caller = require_role(&self.ctx, caller, Role::Super).await?;
        let new_user = validate_create(req)?;

        let id = self
            .ctx
            .identity
            .create_account(&new_user.email, &new_user.password)
            .await?;

        if let Err(e) = identity::merge_role_claim(self.ctx.identity.as_ref(), &id, new_user.role).await
        {
            tracing::warn!(
                account = %id,
                "orphaned identity account (claim write failed): {}; reconciliation sweep required",
                e
            );
            return Err(e.into());
        }

        let profile = Profile {
            id: id.clone(),
            email: new_user.email,
            role: new_user.role,
            push_token: None,
            created_by: caller,
            created_at: Utc::now(),
        };

        if let Err(e) = self.ctx.profiles.insert(&profile).await {
            tracing::warn!(
                account = %id,
                "orphaned identity account (profile write failed): {}; reconciliation sweep required",
                e
            );
            return Err(e.into());
        }

        tracing::info!(account = %id, role = %profile.role, "user created");
        Ok(CreateUserResponse { id })
    }

    /// Delete the identity account, tolerating not-found, then the profile
    /// on a best-effort basis. Safe to call twice.
    pub async fn delete_user(&self, caller: Option<&str>, id: &str) -> Result<OkResponse, ApiError> {
        require_role(&self.ctx, caller, Role::Super).await?;
        validate_id(id)?;

        match self.ctx.identity.delete_account(id).await {
            Ok(()) | Err(IdentityError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        // Best-effort: a stale profile is recoverable, a failed delete is
        // recorded rather than surfaced
        if let Err(e) = self.ctx.profiles.delete(id).await {
            tracing::warn!(account = %id, "best-effort profile delete failed: {}", e);
        }

        tracing::info!(account = %id, "user deleted");
        Ok(OkResponse { ok: true })
    }

    /// Update the stored role and the authorization claim as two
    /// independent writes; no rollback when the second fails.
    pub async fn set_role(
        &self,
        caller: Option<&str>,
        id: &str,
        req: SetRoleRequest,
    ) -> Result<OkResponse, ApiError> {
        require_role(&self.ctx, caller, Role::Super).await?;
        validate_id(id)?;

        let role = req
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or_else(|| ApiError::invalid_argument("role must be one of user, admin, super"))?;

        self.ctx.profiles.update_role(id, role).await?;
        identity::merge_role_claim(self.ctx.identity.as_ref(), id, role).await?;

        tracing::info!(account = %id, role = %role, "role updated");
        Ok(OkResponse { ok: true })
    }
}
