use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::{Comment, CommentView};
use crate::service::comment::CommentInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/videos/{id}/comments",
            get(video_comments).post(add_comment),
        )
        .route(
            "/comments/{id}",
            axum::routing::patch(update_comment).delete(delete_comment),
        )
}

async fn video_comments(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<CommentView>>, ServiceError> {
    svc.video_comments(&id, page).map(Json)
}

async fn add_comment(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Comment>, ServiceError> {
    svc.add_comment(&principal, &id, &input.content).map(Json)
}

async fn update_comment(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Comment>, ServiceError> {
    svc.update_comment(&principal, &id, &input.content).map(Json)
}

async fn delete_comment(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_comment(&principal, &id)?;
    Ok(Json(serde_json::json!({"deleted": true})))
}
