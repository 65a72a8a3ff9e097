//! Notification endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppError;
use shared::models::Notification;

use super::ApiResult;
use crate::auth::Requester;
use crate::state::AppState;

/// Most recent notifications returned per request
pub const NOTIFICATION_PAGE: usize = 50;

/// GET /api/notifications/my-notifications
pub async fn my_notifications(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<Notification>> {
    Ok(Json(
        state
            .stores
            .notifications
            .list_for_recipient(requester.id, NOTIFICATION_PAGE)
            .await?,
    ))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<i64>,
) -> ApiResult<Notification> {
    state
        .stores
        .notifications
        .mark_read(id, requester.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Notification"))
}
