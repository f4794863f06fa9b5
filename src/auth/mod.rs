use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// User role, ordered user < admin < super.
///
/// Callers with no profile document act as an implicit "guest" below all
/// three; that case is modeled as the absence of a role, not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Super,
}

impl Role {
    /// Strict parse against the enumerated set.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "super" => Some(Role::Super),
            _ => None,
        }
    }

    /// Defensive normalization for values read back from storage: lower-case,
    /// and anything outside {admin, super} maps to user.
    pub fn normalize(s: &str) -> Role {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "super" => Role::Super,
            _ => Role::User,
        }
    }

    pub fn satisfies(self, minimum: Role) -> bool {
        self >= minimum
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Super => "super",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bearer-token claims. The identity provider issues these to mobile
/// clients; this service only validates them to learn the caller id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("invalid JWT token: {0}")]
    TokenValidation(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| JwtError::TokenValidation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering() {
        assert!(Role::Super.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(!Role::Admin.satisfies(Role::Super));
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn normalize_maps_unknown_values_to_user() {
        assert_eq!(Role::normalize("SUPER"), Role::Super);
        assert_eq!(Role::normalize("Admin"), Role::Admin);
        assert_eq!(Role::normalize("moderator"), Role::User);
        assert_eq!(Role::normalize(""), Role::User);
    }

    #[test]
    fn jwt_round_trip() {
        let claims = Claims::new("uid-1", 1);
        let token = generate_jwt(&claims, "test-secret").unwrap();
        let decoded = validate_jwt(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, "uid-1");
    }

    #[test]
    fn jwt_rejects_wrong_secret() {
        let claims = Claims::new("uid-1", 1);
        let token = generate_jwt(&claims, "test-secret").unwrap();
        assert!(validate_jwt(&token, "other-secret").is_err());
    }
}
