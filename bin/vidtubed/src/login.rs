//! Login endpoint — verifies credentials and issues an access token.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::info;

use vidtube_core::ServiceError;

use crate::auth_middleware::Claims;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let profile = state
        .service
        .verify_credentials(&body.username, &body.password)?;

    let now = chrono::Utc::now().timestamp();
    let expire_secs = state.server_config.jwt.expire_secs;
    let claims = Claims {
        sub: profile.id.clone(),
        name: profile.username.clone(),
        iat: now,
        exp: now + expire_secs as i64,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.server_config.jwt.secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Internal(e.to_string()))?;

    info!(user = %profile.id, username = %profile.username, "login");
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: expire_secs,
    }))
}
