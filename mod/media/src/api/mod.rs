pub mod comment;
pub mod dashboard;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

use std::sync::Arc;

use axum::Router;

use crate::service::MediaService;

/// Shared application state.
pub type AppState = Arc<MediaService>;

/// Build the media API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/media/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(user::routes())
        .merge(video::routes())
        .merge(comment::routes())
        .merge(tweet::routes())
        .merge(like::routes())
        .merge(subscription::routes())
        .merge(playlist::routes())
        .merge(dashboard::routes())
}
