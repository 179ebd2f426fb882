//! Route registration — module routes plus system and media endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use vidtube_blob::BlobStore;
use vidtube_core::Principal;

use crate::auth_middleware::{self, JwtState};
use crate::login;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub jwt_state: Arc<JwtState>,
    pub server_config: Arc<crate::config::ServerConfig>,
    pub service: Arc<vidtube_media::service::MediaService>,
    pub blob: Arc<dyn BlobStore>,
}

/// Build the complete router.
pub fn build_router(state: AppState, module_routes: Vec<(String, Router)>) -> Router {
    let jwt_state = state.jwt_state.clone();

    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router<()> = Router::new()
        .route("/media-files/{*key}", get(get_media).put(put_media))
        .merge(login::routes())
        .with_state(state);

    app = app.merge(system_routes);

    // Module routers carry their own prefix and state.
    for (name, router) in module_routes {
        tracing::info!(module = %name, "module routes mounted");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "vidtubed",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve raw media bytes. Public.
async fn get_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Vec<u8>, StatusCode> {
    match state.blob.get(&key) {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(vidtube_blob::BlobError::InvalidKey(_)) => Err(StatusCode::BAD_REQUEST),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Upload media bytes under a caller-chosen key. Records reference the
/// key afterwards; publishing validates it exists.
async fn put_media(
    State(state): State<AppState>,
    _principal: Principal,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<axum::Json<serde_json::Value>, StatusCode> {
    if body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.blob.put(&key, &body) {
        Ok(()) => Ok(axum::Json(serde_json::json!({"key": key}))),
        Err(vidtube_blob::BlobError::InvalidKey(_)) => Err(StatusCode::BAD_REQUEST),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
