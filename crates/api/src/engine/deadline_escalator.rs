//! Deadline risk escalator.
//!
//! One sweep walks every project and each project's tasks, reduces them to
//! [`TrackedItem`]s and feeds each through [`process_item`]:
//!
//! ```text
//! approaching, no open record   -> insert risk           -> notify owner
//! missed, open approaching risk -> escalate row in place -> notify owner (urgent)
//! missed, no open record        -> insert issue          -> notify owner (urgent)
//! anything else                 -> nothing
//! ```
//!
//! Inserts go through `ON CONFLICT DO NOTHING` on the open-source unique
//! index and escalation is a conditional update, so when two sweeps overlap
//! only the one whose write lands sends the notification.

use pulse_core::deadline_risk::{
    draft_issue, draft_risk, issue_notification_message, plan, risk_notification_message,
    DeadlinePhase, EscalationAction, ExistingRecord, RecordDraft, TrackedItem, TrackedKind,
};
use pulse_core::status::RiskSourceKind;
use pulse_core::types::Timestamp;
use pulse_db::models::notification::NewNotification;
use pulse_db::models::project::Project;
use pulse_db::models::risk_issue::{DeadlineEscalation, NewDeadlineRecord, RiskIssue};
use pulse_db::models::task::Task;
use pulse_db::repositories::{ProjectRepo, RiskIssueRepo, TaskRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::notifications::Notifier;

/// Counters reported at the end of every sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub projects_scanned: usize,
    pub tasks_scanned: usize,
    pub risks_created: usize,
    pub issues_escalated: usize,
    pub issues_created: usize,
    /// Items (or task lists) that could not be processed.
    pub failed: usize,
}

impl SweepSummary {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::RiskCreated => self.risks_created += 1,
            ItemOutcome::IssueEscalated => self.issues_escalated += 1,
            ItemOutcome::IssueCreated => self.issues_created += 1,
            ItemOutcome::Untracked | ItemOutcome::Unchanged | ItemOutcome::LostRace => {}
        }
    }
}

/// What happened to a single item during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// No deadline, or the item is in a terminal status.
    Untracked,
    Unchanged,
    RiskCreated,
    IssueEscalated,
    IssueCreated,
    /// Another writer created or escalated the record first.
    LostRace,
}

/// Run one full sweep over all projects and their tasks.
///
/// Only a failure to list projects aborts the sweep; per-project and
/// per-item failures are logged and counted in [`SweepSummary::failed`].
pub async fn run_sweep(
    pool: &PgPool,
    notifier: &Notifier,
    now: Timestamp,
) -> Result<SweepSummary, sqlx::Error> {
    let mut summary = SweepSummary::default();
    let projects = ProjectRepo::list_all(pool).await?;

    for project in &projects {
        summary.projects_scanned += 1;
        process_and_record(pool, notifier, project_item(project), now, &mut summary).await;

        let tasks = match TaskRepo::list_by_project(pool, project.id).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(project_id = project.id, error = %e, "Failed to load project tasks");
                summary.failed += 1;
                continue;
            }
        };
        for task in &tasks {
            summary.tasks_scanned += 1;
            process_and_record(pool, notifier, task_item(task), now, &mut summary).await;
        }
    }

    tracing::info!(
        projects_scanned = summary.projects_scanned,
        tasks_scanned = summary.tasks_scanned,
        risks_created = summary.risks_created,
        issues_escalated = summary.issues_escalated,
        issues_created = summary.issues_created,
        failed = summary.failed,
        "Deadline sweep complete"
    );
    Ok(summary)
}

async fn process_and_record(
    pool: &PgPool,
    notifier: &Notifier,
    item: TrackedItem,
    now: Timestamp,
    summary: &mut SweepSummary,
) {
    match process_item(pool, notifier, &item, now).await {
        Ok(outcome) => summary.record(outcome),
        Err(e) => {
            tracing::error!(
                kind = item.kind.as_str(),
                id = item.id,
                error = %e,
                "Deadline check failed"
            );
            summary.failed += 1;
        }
    }
}

/// Check one project or task and create or escalate its deadline record.
pub async fn process_item(
    pool: &PgPool,
    notifier: &Notifier,
    item: &TrackedItem,
    now: Timestamp,
) -> Result<ItemOutcome, sqlx::Error> {
    let Some(phase) = item.phase(now) else {
        return Ok(ItemOutcome::Untracked);
    };
    if phase == DeadlinePhase::Clear {
        return Ok(ItemOutcome::Unchanged);
    }

    let existing = RiskIssueRepo::find_open_for_source(pool, item.kind.as_str(), item.id)
        .await?
        .and_then(|row| existing_record(&row));

    match plan(phase, existing) {
        EscalationAction::Nothing => Ok(ItemOutcome::Unchanged),

        EscalationAction::CreateRisk => {
            let DeadlinePhase::Approaching { days_left } = phase else {
                return Ok(ItemOutcome::Unchanged);
            };
            let draft = draft_risk(item, days_left);
            if insert_record(pool, item, &draft).await?.is_none() {
                return Ok(ItemOutcome::LostRace);
            }
            tracing::info!(
                kind = item.kind.as_str(),
                id = item.id,
                days_left,
                "Deadline risk created"
            );
            notify_owner(notifier, item, risk_notification_message(item, days_left), false).await;
            Ok(ItemOutcome::RiskCreated)
        }

        EscalationAction::EscalateInPlace(record_id) => {
            let draft = draft_issue(item);
            let change = DeadlineEscalation {
                expected_source_kind: item.kind.approaching_source().as_str(),
                record_type: draft.record_type.as_str(),
                title: &draft.title,
                description: &draft.description,
                priority: draft.priority.as_str(),
                source_kind: draft.source_kind.as_str(),
            };
            if RiskIssueRepo::escalate(pool, record_id, &change)
                .await?
                .is_none()
            {
                return Ok(ItemOutcome::LostRace);
            }
            tracing::info!(
                kind = item.kind.as_str(),
                id = item.id,
                risk_issue_id = record_id,
                "Deadline risk escalated to issue"
            );
            notify_owner(notifier, item, issue_notification_message(item), true).await;
            Ok(ItemOutcome::IssueEscalated)
        }

        EscalationAction::CreateIssue => {
            let draft = draft_issue(item);
            if insert_record(pool, item, &draft).await?.is_none() {
                return Ok(ItemOutcome::LostRace);
            }
            tracing::info!(
                kind = item.kind.as_str(),
                id = item.id,
                "Missed-deadline issue created"
            );
            notify_owner(notifier, item, issue_notification_message(item), true).await;
            Ok(ItemOutcome::IssueCreated)
        }
    }
}

pub fn project_item(project: &Project) -> TrackedItem {
    TrackedItem {
        kind: TrackedKind::Project,
        id: project.id,
        project_id: project.id,
        title: project.title.clone(),
        deadline: project.deadline,
        status: project.status.clone(),
        owner_user_id: project.manager_user_id,
    }
}

pub fn task_item(task: &Task) -> TrackedItem {
    TrackedItem {
        kind: TrackedKind::Task,
        id: task.id,
        project_id: task.project_id,
        title: task.title.clone(),
        deadline: task.deadline,
        status: task.status.clone(),
        owner_user_id: task.assigned_user_id,
    }
}

fn existing_record(row: &RiskIssue) -> Option<ExistingRecord> {
    let source_kind = row
        .source_kind
        .as_deref()
        .and_then(|kind| RiskSourceKind::from_str_value(kind).ok())?;
    Some(ExistingRecord {
        id: row.id,
        source_kind,
    })
}

async fn insert_record(
    pool: &PgPool,
    item: &TrackedItem,
    draft: &RecordDraft,
) -> Result<Option<RiskIssue>, sqlx::Error> {
    let record = NewDeadlineRecord {
        project_id: item.project_id,
        record_type: draft.record_type.as_str(),
        title: &draft.title,
        description: &draft.description,
        priority: draft.priority.as_str(),
        source_kind: draft.source_kind.as_str(),
        source_entity_type: item.kind.as_str(),
        source_entity_id: item.id,
    };
    RiskIssueRepo::insert_deadline_record(pool, &record).await
}

async fn notify_owner(notifier: &Notifier, item: &TrackedItem, message: String, urgent: bool) {
    let Some(owner) = item.owner_user_id else {
        tracing::debug!(
            kind = item.kind.as_str(),
            id = item.id,
            "No owner to notify about deadline"
        );
        return;
    };
    let notification = NewNotification::about(owner, message, item.kind.related_entity(), item.id);
    let notification = if urgent {
        notification.urgent()
    } else {
        notification
    };
    notifier.notify(notification).await;
}
