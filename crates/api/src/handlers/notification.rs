//! Handlers for the `/notifications` resource.
//!
//! All endpoints act on the authenticated user's own notifications.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::types::DbId;
use pulse_db::models::notification::Notification;
use pulse_db::repositories::NotificationRepo;
use pulse_db::{clamp_limit, clamp_offset};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::NotificationListParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<NotificationListParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.unread_only,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// 204 on success, 404 if the notification is not the caller's.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, id, auth.user_id).await? {
        return Err(AppError::not_found("Notification", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}
