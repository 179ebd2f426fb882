use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use vidtube_core::{ListResult, PageParams, Principal, ServiceError};

use super::AppState;
use crate::model::{ChannelEntry, SubscriberEntry};
use crate::service::toggle::ToggleOutcome;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions/{channelId}", post(toggle_subscription))
        .route(
            "/subscriptions/channel/{id}/subscribers",
            get(channel_subscribers),
        )
        .route("/subscriptions/user/{id}/channels", get(subscribed_channels))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResponse {
    subscribed: bool,
}

async fn toggle_subscription(
    State(svc): State<AppState>,
    principal: Principal,
    Path(channel_id): Path<String>,
) -> Result<Json<ToggleResponse>, ServiceError> {
    let outcome = svc.toggle_subscription(&principal, &channel_id)?;
    Ok(Json(ToggleResponse {
        subscribed: matches!(outcome, ToggleOutcome::Added),
    }))
}

async fn channel_subscribers(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<SubscriberEntry>>, ServiceError> {
    svc.channel_subscribers(&principal, &id, page).map(Json)
}

async fn subscribed_channels(
    State(svc): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListResult<ChannelEntry>>, ServiceError> {
    svc.subscribed_channels(&principal, &id, page).map(Json)
}
