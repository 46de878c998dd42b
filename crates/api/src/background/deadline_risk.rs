//! Daily deadline sweep and approval reminders.
//!
//! The first cycle runs after `deadline_sweep_initial_delay_secs`, then every
//! `deadline_sweep_interval_secs`. Each cycle runs the deadline escalator and
//! re-sends approval requests nobody has acted on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pulse_core::types::Timestamp;
use pulse_db::models::notification::NewNotification;
use pulse_db::repositories::NotificationRepo;
use sqlx::PgPool;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::JobsConfig;
use crate::engine::deadline_escalator::run_sweep;
use crate::notifications::Notifier;

/// Unread approval requests are re-sent after this many days.
pub const APPROVAL_REMINDER_DAYS: i64 = 2;

/// Run the deadline sweep loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    notifier: Arc<Notifier>,
    config: JobsConfig,
    cancel: CancellationToken,
) {
    let initial_delay = Duration::from_secs(config.deadline_sweep_initial_delay_secs);
    let period = Duration::from_secs(config.deadline_sweep_interval_secs);

    tracing::info!(
        initial_delay_secs = initial_delay.as_secs(),
        interval_secs = period.as_secs(),
        "Deadline risk job started"
    );

    let mut interval = tokio::time::interval_at(Instant::now() + initial_delay, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Deadline risk job stopping");
                break;
            }
            _ = interval.tick() => {
                run_cycle(&pool, &notifier, Utc::now()).await;
            }
        }
    }
}

/// One scheduled cycle: deadline sweep, then approval reminders.
pub async fn run_cycle(pool: &PgPool, notifier: &Notifier, now: Timestamp) {
    if let Err(e) = run_sweep(pool, notifier, now).await {
        tracing::error!(error = %e, "Deadline sweep failed");
    }

    match send_approval_reminders(pool, notifier, now).await {
        Ok(0) => tracing::debug!("No approval reminders due"),
        Ok(sent) => tracing::info!(sent, "Approval reminders sent"),
        Err(e) => tracing::error!(error = %e, "Approval reminders failed"),
    }
}

/// Re-send unread approval requests older than [`APPROVAL_REMINDER_DAYS`].
///
/// Each request is claimed by stamping `last_reminder_sent` before the
/// reminder is created, so overlapping runs remind once. Returns the number
/// of reminders stored.
pub async fn send_approval_reminders(
    pool: &PgPool,
    notifier: &Notifier,
    now: Timestamp,
) -> Result<usize, sqlx::Error> {
    let older_than = now - chrono::Duration::days(APPROVAL_REMINDER_DAYS);
    let due = NotificationRepo::list_due_approval_reminders(pool, older_than).await?;

    let mut sent = 0;
    for request in due {
        match NotificationRepo::mark_reminder_sent(pool, request.id, older_than).await {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::error!(notification_id = request.id, error = %e, "Failed to claim approval reminder");
                continue;
            }
        }

        let reminder = NewNotification {
            user_id: request.user_id,
            message: format!("Reminder: {}", request.message),
            related_entity: request.related_entity.clone(),
            related_entity_id: request.related_entity_id,
            ..Default::default()
        }
        .as_reminder();
        if notifier.notify(reminder).await.is_some() {
            sent += 1;
        }
    }
    Ok(sent)
}
