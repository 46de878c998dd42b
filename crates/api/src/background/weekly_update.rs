//! Weekly update reminders and escalations.
//!
//! Ticks hourly and acts at most once per calendar day. On the configured
//! reminder weekday, managers of reporting projects without an update for
//! the current week are reminded. On the following day every still-missing
//! update is escalated to the manager, the department director, the
//! department's secondary PMO and all main PMO users.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use pulse_core::roles::ROLE_MAIN_PMO;
use pulse_core::types::{DbId, Timestamp};
use pulse_core::weekly_update::{
    escalation_message, reminder_message, reporting_week, ReportingWeek, WeekNumbering,
    WeeklyPhase,
};
use pulse_db::models::notification::NewNotification;
use pulse_db::models::project::ProjectMissingUpdate;
use pulse_db::repositories::{DepartmentRepo, NotificationRepo, ProjectRepo, UserRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::JobsConfig;
use crate::notifications::Notifier;

/// How often the job wakes up to check the calendar.
const TICK_INTERVAL: Duration = Duration::from_secs(3600);

/// `notifications.related_entity` for weekly update reminders.
const RELATED_ENTITY: &str = "Project";

/// Outcome of one daily run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySummary {
    pub phase: WeeklyPhase,
    /// Reporting week acted on. `None` on idle days.
    pub week: Option<ReportingWeek>,
    pub missing_updates: usize,
    pub notifications_sent: usize,
    /// Recipients already notified today.
    pub skipped: usize,
    pub failed: usize,
}

impl WeeklySummary {
    fn idle() -> Self {
        Self {
            phase: WeeklyPhase::Idle,
            week: None,
            missing_updates: 0,
            notifications_sent: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

/// Run the weekly update loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    notifier: Arc<Notifier>,
    config: JobsConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        reminder_weekday = %config.weekly_reminder_weekday,
        week_numbering = config.week_numbering.as_str(),
        "Weekly update job started"
    );

    let mut interval = tokio::time::interval(TICK_INTERVAL);
    let mut last_run: Option<NaiveDate> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Weekly update job stopping");
                break;
            }
            _ = interval.tick() => {
                let now = Utc::now();
                let today = now.date_naive();
                if last_run == Some(today) {
                    continue;
                }
                match run_for_date(
                    &pool,
                    &notifier,
                    config.weekly_reminder_weekday,
                    config.week_numbering,
                    today,
                    now,
                )
                .await
                {
                    Ok(summary) => {
                        last_run = Some(today);
                        if summary.phase != WeeklyPhase::Idle {
                            tracing::info!(
                                phase = ?summary.phase,
                                missing_updates = summary.missing_updates,
                                notifications_sent = summary.notifications_sent,
                                skipped = summary.skipped,
                                failed = summary.failed,
                                "Weekly update job complete"
                            );
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "Weekly update job failed"),
                }
            }
        }
    }
}

/// Do whatever `today` calls for. Safe to call more than once per day:
/// recipients already notified since midnight UTC are skipped.
pub async fn run_for_date(
    pool: &PgPool,
    notifier: &Notifier,
    reminder_weekday: Weekday,
    numbering: WeekNumbering,
    today: NaiveDate,
    now: Timestamp,
) -> Result<WeeklySummary, sqlx::Error> {
    let phase = WeeklyPhase::for_date(today, reminder_weekday);
    if phase == WeeklyPhase::Idle {
        return Ok(WeeklySummary::idle());
    }

    let week = reporting_week(phase.reference_date(today), numbering);
    let missing = ProjectRepo::list_missing_weekly_update(pool, week.year, week.week_number).await?;
    let start_of_day = today.and_time(NaiveTime::MIN).and_utc();

    let mut summary = WeeklySummary {
        phase,
        week: Some(week),
        missing_updates: missing.len(),
        ..WeeklySummary::idle()
    };

    let main_pmo_ids: Vec<DbId> = match phase {
        WeeklyPhase::Escalate => UserRepo::list_active_by_roles(pool, &[ROLE_MAIN_PMO])
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect(),
        WeeklyPhase::Idle | WeeklyPhase::Remind => Vec::new(),
    };

    for project in &missing {
        let (recipients, message, urgent) = match phase {
            WeeklyPhase::Escalate => (
                escalation_recipients(pool, project, &main_pmo_ids).await,
                escalation_message(&project.title, week),
                true,
            ),
            WeeklyPhase::Idle | WeeklyPhase::Remind => (
                vec![project.manager_user_id],
                reminder_message(&project.title, week),
                false,
            ),
        };

        for user_id in recipients {
            match NotificationRepo::reminder_sent_since(
                pool,
                user_id,
                RELATED_ENTITY,
                project.project_id,
                start_of_day,
            )
            .await
            {
                Ok(true) => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        project_id = project.project_id,
                        user_id,
                        error = %e,
                        "Failed to check weekly reminder history"
                    );
                    summary.failed += 1;
                    continue;
                }
            }

            let notification =
                NewNotification::about(user_id, message.clone(), RELATED_ENTITY, project.project_id)
                    .as_reminder();
            let notification = if urgent {
                notification.urgent()
            } else {
                notification
            };
            match notifier.notify(notification).await {
                Some(_) => summary.notifications_sent += 1,
                None => summary.failed += 1,
            }
        }
    }

    tracing::debug!(
        year = week.year,
        week_number = week.week_number,
        ?phase,
        "Weekly update check finished"
    );
    Ok(summary)
}

/// Manager, department director, secondary PMO and main PMO users, deduplicated.
async fn escalation_recipients(
    pool: &PgPool,
    project: &ProjectMissingUpdate,
    main_pmo_ids: &[DbId],
) -> Vec<DbId> {
    let mut recipients = vec![project.manager_user_id];

    if let Some(department_id) = project.department_id {
        match DepartmentRepo::find_by_id(pool, department_id).await {
            Ok(Some(department)) => {
                recipients.extend(department.director_user_id);
                recipients.extend(department.secondary_pmo_user_id);
            }
            Ok(None) => {}
            Err(e) => tracing::error!(
                project_id = project.project_id,
                department_id,
                error = %e,
                "Failed to load department for escalation"
            ),
        }
    }

    recipients.extend_from_slice(main_pmo_ids);

    let mut seen = Vec::with_capacity(recipients.len());
    recipients.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
    recipients
}
