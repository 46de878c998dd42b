//! Notification entity model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub related_entity: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub is_read: bool,
    pub is_urgent: bool,
    pub requires_approval: bool,
    pub last_reminder_sent: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a notification.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub user_id: DbId,
    pub message: String,
    pub related_entity: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub is_urgent: bool,
    pub requires_approval: bool,
    /// Stamp `last_reminder_sent` at insert time.
    pub is_reminder: bool,
}

impl NewNotification {
    /// A plain notification about `related_entity` #`related_entity_id`.
    pub fn about(
        user_id: DbId,
        message: impl Into<String>,
        related_entity: &str,
        related_entity_id: DbId,
    ) -> Self {
        Self {
            user_id,
            message: message.into(),
            related_entity: Some(related_entity.to_string()),
            related_entity_id: Some(related_entity_id),
            ..Default::default()
        }
    }

    pub fn urgent(mut self) -> Self {
        self.is_urgent = true;
        self
    }

    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    pub fn as_reminder(mut self) -> Self {
        self.is_reminder = true;
        self
    }
}
