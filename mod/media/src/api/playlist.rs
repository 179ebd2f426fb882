use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::{Playlist, PlaylistWithOwner};
use crate::service::playlist::{PlaylistInput, UpdatePlaylistInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", post(create_playlist))
        .route(
            "/playlists/{id}",
            get(get_playlist).patch(update_playlist).delete(delete_playlist),
        )
        .route(
            "/playlists/{id}/videos/{videoId}",
            post(add_video).delete(remove_video),
        )
        .route("/users/{id}/playlists", get(user_playlists))
}

async fn create_playlist(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<PlaylistInput>,
) -> Result<Json<Playlist>, ServiceError> {
    svc.create_playlist(&principal, input).map(Json)
}

async fn get_playlist(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlaylistWithOwner>, ServiceError> {
    svc.get_playlist(&id).map(Json)
}

async fn user_playlists(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<Playlist>>, ServiceError> {
    svc.user_playlists(&id, page).map(Json)
}

async fn update_playlist(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(input): Json<UpdatePlaylistInput>,
) -> Result<Json<Playlist>, ServiceError> {
    svc.update_playlist(&principal, &id, input).map(Json)
}

async fn delete_playlist(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_playlist(&principal, &id)?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

async fn add_video(
    State(svc): State<AppState>,
    principal: Principal,
    Path((id, video_id)): Path<(String, String)>,
) -> Result<Json<Playlist>, ServiceError> {
    svc.add_video_to_playlist(&principal, &id, &video_id).map(Json)
}

async fn remove_video(
    State(svc): State<AppState>,
    principal: Principal,
    Path((id, video_id)): Path<(String, String)>,
) -> Result<Json<Playlist>, ServiceError> {
    svc.remove_video_from_playlist(&principal, &id, &video_id)
        .map(Json)
}
