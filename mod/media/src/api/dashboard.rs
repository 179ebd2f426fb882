use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use vidtube_core::{Principal, ServiceError};

use super::AppState;
use crate::model::{ChannelStats, Video};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/videos", get(videos))
}

async fn stats(
    State(svc): State<AppState>,
    principal: Principal,
) -> Result<Json<ChannelStats>, ServiceError> {
    svc.channel_stats(principal.user_id()).map(Json)
}

async fn videos(
    State(svc): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Video>>, ServiceError> {
    svc.dashboard_videos(&principal).map(Json)
}
