// handlers/protected/notifications.rs - In-app notifications and the reminder trigger

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::gate::Session;
use crate::database::models::Notification;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{NotificationService, ReminderReport, ReminderService};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread: bool,
    pub limit: Option<i64>,
}

/// GET /api/notifications?unread=true&limit=50 - Own notifications, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Notification>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let notifications = NotificationService::new(state.pool.clone())
        .list(session.user_id, query.unread, limit)
        .await?;
    Ok(ApiResponse::success(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Value> {
    let count = NotificationService::new(state.pool.clone())
        .unread_count(session.user_id)
        .await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Notification> {
    let notification = NotificationService::new(state.pool.clone())
        .mark_read(session.user_id, id)
        .await?;
    Ok(ApiResponse::success(notification))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Value> {
    let updated = NotificationService::new(state.pool.clone())
        .mark_all_read(session.user_id)
        .await?;
    Ok(ApiResponse::success(json!({ "updated": updated })))
}

/// POST /api/reminders/run - Run one reminder pass now (owner only)
///
/// Honors the same month-end window as the scheduled job; `skipped` is true outside it.
pub async fn run_reminders(State(state): State<AppState>) -> ApiResult<ReminderReport> {
    let report = ReminderService::new(state.pool.clone(), state.config.reminders.window_days)
        .run(Utc::now())
        .await?;
    Ok(ApiResponse::success(report))
}
