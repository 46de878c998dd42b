//! Notification emitter.
//!
//! [`Notifier`] is the single write path for notifications. It persists the
//! row and, when SMTP is configured, mirrors it to the recipient's email.
//! Failures never reach the caller: a notification that cannot be stored or
//! mailed is logged and dropped so the triggering operation still succeeds.

use pulse_core::types::DbId;
use pulse_db::models::notification::{NewNotification, Notification};
use pulse_db::repositories::{NotificationRepo, UserRepo};
use pulse_db::DbPool;
use pulse_events::{EmailDelivery, OutgoingEmail};

pub struct Notifier {
    pool: DbPool,
    email: Option<EmailDelivery>,
}

impl Notifier {
    /// Create a notifier. `email` is `None` when SMTP is not configured.
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    /// Store a notification and mail a copy. Returns the new row's id, or
    /// `None` if it could not be stored.
    pub async fn notify(&self, input: NewNotification) -> Option<DbId> {
        match NotificationRepo::create(&self.pool, &input).await {
            Ok(notification) => {
                tracing::debug!(
                    notification_id = notification.id,
                    user_id = notification.user_id,
                    related_entity = ?notification.related_entity,
                    related_entity_id = ?notification.related_entity_id,
                    "Notification stored"
                );
                self.mail(&notification).await;
                Some(notification.id)
            }
            Err(e) => {
                tracing::error!(
                    user_id = input.user_id,
                    error = %e,
                    "Failed to store notification"
                );
                None
            }
        }
    }

    /// Notify several users with the same template. Returns how many were stored.
    pub async fn notify_all<F>(&self, user_ids: &[DbId], build: F) -> usize
    where
        F: Fn(DbId) -> NewNotification,
    {
        let mut stored = 0;
        for &user_id in user_ids {
            if self.notify(build(user_id)).await.is_some() {
                stored += 1;
            }
        }
        stored
    }

    async fn mail(&self, notification: &Notification) {
        let Some(delivery) = &self.email else {
            return;
        };

        let recipient = match UserRepo::find_by_id(&self.pool, notification.user_id).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => return,
            Err(e) => {
                tracing::error!(
                    user_id = notification.user_id,
                    error = %e,
                    "Failed to load notification recipient"
                );
                return;
            }
        };

        let email = OutgoingEmail::for_notification(
            &recipient.email,
            &recipient.name,
            &notification.message,
            notification.is_urgent,
            notification.requires_approval,
        );
        if let Err(e) = delivery.send(&email).await {
            tracing::warn!(
                notification_id = notification.id,
                user_id = recipient.id,
                error = %e,
                "Failed to email notification"
            );
        }
    }
}
