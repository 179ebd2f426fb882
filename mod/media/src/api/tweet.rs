use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::Tweet;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tweets", post(create_tweet))
        .route("/tweets/{id}", patch(update_tweet).delete(delete_tweet))
        .route("/users/{id}/tweets", get(user_tweets))
}

#[derive(Deserialize)]
struct TweetInput {
    content: String,
}

async fn create_tweet(
    State(svc): State<AppState>,
    principal: Principal,
    Json(input): Json<TweetInput>,
) -> Result<Json<Tweet>, ServiceError> {
    svc.create_tweet(&principal, &input.content).map(Json)
}

async fn user_tweets(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<Tweet>>, ServiceError> {
    svc.user_tweets(&id, page).map(Json)
}

async fn update_tweet(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(input): Json<TweetInput>,
) -> Result<Json<Tweet>, ServiceError> {
    svc.update_tweet(&principal, &id, &input.content).map(Json)
}

async fn delete_tweet(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_tweet(&principal, &id)?;
    Ok(Json(serde_json::json!({"deleted": true})))
}
