//! JWT authentication middleware.
//!
//! Extracts the token from `Authorization: Bearer <token>`, validates
//! it, and attaches a [`Principal`] to the request extensions for the
//! module handlers to extract.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use vidtube_core::Principal;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Username, for logging.
    pub name: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "missing authorization token".to_string(),
            AuthError::InvalidToken(e) => format!("invalid token: {}", e),
        };
        let body = serde_json::json!({
            "code": "UNAUTHENTICATED",
            "message": message,
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Middleware validating the bearer token on every non-public request.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if is_public(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let claims = token_data.claims;
    request.extensions_mut().insert(Principal(claims.sub.clone()));
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Requests that pass without a token. Media bytes are public to read
/// but uploading them requires auth, hence the method check.
fn is_public(method: &Method, path: &str) -> bool {
    matches!(path, "/" | "/health" | "/version")
        || path == "/auth/login"
        || path == "/media/v1/users/register"
        || (*method == Method::GET && path.starts_with("/media-files/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/auth/login"));
        assert!(is_public(&Method::POST, "/media/v1/users/register"));
        assert!(is_public(&Method::GET, "/media-files/videos/a.mp4"));
        assert!(!is_public(&Method::PUT, "/media-files/videos/a.mp4"));
        assert!(!is_public(&Method::GET, "/media/v1/videos"));
    }
}
