use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;

/// Caller identity extracted from a bearer token.
#[derive(Clone, Debug)]
pub struct Caller {
    pub id: String,
}

/// Bearer-token middleware.
///
/// A valid token attaches a `Caller` extension; a request with no
/// Authorization header passes through with no caller, and the
/// authorization guard - not the transport - decides whether that is
/// acceptable. Only a malformed or forged token is rejected here.
pub async fn caller_identity_middleware(
    State(jwt_secret): State<String>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(&headers)? {
        let claims = auth::validate_jwt(&token, &jwt_secret)
            .map_err(|e| ApiError::unauthenticated(e.to_string()))?;
        request.extensions_mut().insert(Caller { id: claims.sub });
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(header) = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
    else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("invalid Authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Authorization header must use Bearer format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthenticated("empty bearer token"));
    }

    Ok(Some(token.to_string()))
}
