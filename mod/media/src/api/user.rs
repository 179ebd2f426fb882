use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use vidtube_core::{Principal, ServiceError};

use super::AppState;
use crate::model::UserProfile;
use crate::service::user::{RegisterInput, UpdateAccountInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/me", get(me).patch(update_account))
        .route("/users/me/avatar", patch(update_avatar))
        .route("/users/me/cover-image", patch(update_cover_image))
        .route("/users/{id}", get(get_profile))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageInput {
    media_key: String,
}

async fn register(
    State(svc): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.register(input).map(Json)
}

async fn me(
    State(svc): State<AppState>,
    principal: Principal,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.get_profile(principal.user_id()).map(Json)
}

async fn get_profile(
    State(svc): State<AppState>,
    _principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.get_profile(&id).map(Json)
}

async fn update_account(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<UpdateAccountInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.update_account(&principal, input).map(Json)
}

async fn update_avatar(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<ImageInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.update_avatar(&principal, &input.media_key).map(Json)
}

async fn update_cover_image(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<ImageInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    svc.update_cover_image(&principal, &input.media_key).map(Json)
}
