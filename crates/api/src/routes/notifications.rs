//! Notification inbox.

use axum::{extract::State, Json};
use domain::models::notification::{
    ListNotificationsResponse, MarkNotificationsReadRequest, MarkReadResponse,
};
use domain::models::Notification;
use persistence::repositories::NotificationRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, UserAuth};

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let repo = NotificationRepository::new(state.pool.clone());

    let data = repo
        .list(auth.user_id, state.config.limits.max_notification_rows)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();
    let unread_count = repo.unread_count(auth.user_id).await?;

    Ok(Json(ListNotificationsResponse { data, unread_count }))
}

/// Marks the given notifications read, or all of them when `ids` is absent.
///
/// POST /api/v1/notifications/read
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiJson(request): ApiJson<MarkNotificationsReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = NotificationRepository::new(state.pool.clone())
        .mark_read(auth.user_id, request.ids.as_deref())
        .await?;

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}
