//! Repository for the `notifications` table.

use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{NewNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, message, related_entity, related_entity_id, is_read, \
     is_urgent, requires_approval, last_reminder_sent, created_at, updated_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (user_id, message, related_entity, related_entity_id, is_urgent,
                 requires_approval, last_reminder_sent)
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $7 THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(&input.message)
            .bind(&input.related_entity)
            .bind(input.related_entity_id)
            .bind(input.is_urgent)
            .bind(input.requires_approval)
            .bind(input.is_reminder)
            .fetch_one(pool)
            .await
    }

    /// List notifications for a user, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given user and updated.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every unread notification of a user as read. Returns the count updated.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Whether a reminder about the entity was sent to the user at or after `since`.
    pub async fn reminder_sent_since(
        pool: &PgPool,
        user_id: DbId,
        related_entity: &str,
        related_entity_id: DbId,
        since: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND related_entity = $2 AND related_entity_id = $3
                  AND last_reminder_sent >= $4
             )",
        )
        .bind(user_id)
        .bind(related_entity)
        .bind(related_entity_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Unread approval requests whose subject is still pending and whose last
    /// reminder (or creation) is older than `older_than`.
    pub async fn list_due_approval_reminders(
        pool: &PgPool,
        older_than: Timestamp,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications n
             WHERE n.requires_approval = true
               AND n.is_read = false
               AND COALESCE(n.last_reminder_sent, n.created_at) < $1
               AND (
                   (n.related_entity = 'Project' AND EXISTS (
                       SELECT 1 FROM projects p
                       WHERE p.id = n.related_entity_id AND p.status = 'pending'))
                   OR (n.related_entity = 'ChangeRequest' AND EXISTS (
                       SELECT 1 FROM change_requests c
                       WHERE c.id = n.related_entity_id AND c.status = 'pending'))
               )
             ORDER BY n.id"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(older_than)
            .fetch_all(pool)
            .await
    }

    /// Stamp `last_reminder_sent` unless another run already did after `older_than`.
    pub async fn mark_reminder_sent(
        pool: &PgPool,
        id: DbId,
        older_than: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET last_reminder_sent = NOW() \
             WHERE id = $1 AND COALESCE(last_reminder_sent, created_at) < $2",
        )
        .bind(id)
        .bind(older_than)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
