use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::{LikeTarget, LikedVideoView};
use crate::service::toggle::ToggleOutcome;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/likes/video/{id}", post(toggle_video_like))
        .route("/likes/comment/{id}", post(toggle_comment_like))
        .route("/likes/tweet/{id}", post(toggle_tweet_like))
        .route("/likes/videos", get(liked_videos))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResponse {
    liked: bool,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            liked: outcome.is_added(),
        }
    }
}

async fn toggle_video_like(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ServiceError> {
    svc.toggle_like(&principal, LikeTarget::Video, &id)
        .map(|o| Json(o.into()))
}

async fn toggle_comment_like(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ServiceError> {
    svc.toggle_like(&principal, LikeTarget::Comment, &id)
        .map(|o| Json(o.into()))
}

async fn toggle_tweet_like(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ServiceError> {
    svc.toggle_like(&principal, LikeTarget::Tweet, &id)
        .map(|o| Json(o.into()))
}

async fn liked_videos(
    State(svc): State<AppState>,
    principal: Principal,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<LikedVideoView>>, ServiceError> {
    svc.liked_videos(&principal, page).map(Json)
}
