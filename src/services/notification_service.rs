use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::models::Notification;
use crate::types::NotificationKind;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, related_id, related_type, is_read, created_at";

/// What to tell a user, and what it is about
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
    pub related_type: Option<String>,
}

pub struct NotificationService {
    pool: SqlitePool,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: NewNotification) -> ServiceResult<Notification> {
        insert(&self.pool, notification, Utc::now()).await
    }

    /// Newest first
    pub async fn list(&self, user_id: Uuid, unread_only: bool, limit: i64) -> ServiceResult<Vec<Notification>> {
        let query = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 {} ORDER BY created_at DESC LIMIT $2",
            NOTIFICATION_COLUMNS,
            if unread_only { "AND is_read = 0" } else { "" }
        );

        let rows = sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Only the recipient can mark a notification read
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> ServiceResult<Notification> {
        let query = format!(
            "UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Notification {}", id)))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> ServiceResult<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Insert on any executor so the reminder job can write inside its own transaction
pub(crate) async fn insert<'e, E>(
    executor: E,
    notification: NewNotification,
    now: DateTime<Utc>,
) -> ServiceResult<Notification>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = format!(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, related_id, related_type, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
        RETURNING {}
        "#,
        NOTIFICATION_COLUMNS
    );

    let row = sqlx::query_as::<_, Notification>(&query)
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.related_id)
        .bind(notification.related_type)
        .bind(now)
        .fetch_one(executor)
        .await?;

    tracing::debug!("Notification {} created for {}", row.id, row.user_id);
    Ok(row)
}
