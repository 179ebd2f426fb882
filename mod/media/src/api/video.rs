use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use serde::Deserialize;

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::{Video, VideoWithOwner};
use crate::service::video::{PublishVideoInput, UpdateVideoInput};
use crate::service::views::CatalogSort;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos).post(publish_video))
        .route(
            "/videos/{id}",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/videos/{id}/toggle-publish", post(toggle_publish))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogQuery {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    sort_by: Option<String>,
    sort_dir: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

async fn list_videos(
    State(svc): State<AppState>,
    Query(q): Query<CatalogQuery>,
) -> Result<Json<ListResult<VideoWithOwner>>, ServiceError> {
    let mut sort = CatalogSort::default();
    if let Some(field) = q.sort_by {
        sort.field = field;
    }
    if let Some(dir) = q.sort_dir {
        sort.descending = !dir.eq_ignore_ascii_case("asc");
    }
    svc.all_videos(PageParams::new(q.page, q.limit), sort).map(Json)
}

async fn publish_video(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<PublishVideoInput>,
) -> Result<Json<Video>, ServiceError> {
    svc.publish_video(&principal, input).map(Json)
}

async fn get_video(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoWithOwner>, ServiceError> {
    svc.get_video(&id).map(Json)
}

async fn update_video(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(input): Json<UpdateVideoInput>,
) -> Result<Json<Video>, ServiceError> {
    svc.update_video(&principal, &id, input).map(Json)
}

async fn delete_video(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_video(&principal, &id)?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

async fn toggle_publish(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Video>, ServiceError> {
    svc.toggle_publish(&principal, &id).map(Json)
}
