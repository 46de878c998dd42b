//! Deadline risk classification and escalation planning.
//!
//! Projects and tasks are both reduced to a [`TrackedItem`] so a single
//! routine can decide, for any item, whether an approaching-deadline risk
//! must be opened, an existing risk escalated in place to an issue, or a
//! fresh issue created. The database layer only has to look up the item's
//! open deadline record (if any) and carry out the returned
//! [`EscalationAction`].

use chrono::Duration;
use serde::Serialize;

use crate::status::{Priority, ProjectStatus, RiskIssueType, RiskSourceKind, TaskStatus};
use crate::types::{DbId, Timestamp};

/// Items due within this many days get an approaching-deadline risk.
pub const RISK_WINDOW_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 86_400_000;

// ---------------------------------------------------------------------------
// Phase classification
// ---------------------------------------------------------------------------

/// Whole days until `deadline`, rounded up. Zero or negative once it has passed.
pub fn days_until_deadline(deadline: Timestamp, now: Timestamp) -> i64 {
    let millis = (deadline - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Where an item stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlinePhase {
    /// More than [`RISK_WINDOW_DAYS`] away.
    Clear,
    /// Due within the risk window.
    Approaching { days_left: i64 },
    /// Due today or already overdue.
    Missed,
}

impl DeadlinePhase {
    pub fn classify(days_until: i64) -> Self {
        if days_until <= 0 {
            Self::Missed
        } else if days_until <= RISK_WINDOW_DAYS {
            Self::Approaching {
                days_left: days_until,
            }
        } else {
            Self::Clear
        }
    }

    pub fn at(deadline: Timestamp, now: Timestamp) -> Self {
        Self::classify(days_until_deadline(deadline, now))
    }
}

// ---------------------------------------------------------------------------
// Tracked items
// ---------------------------------------------------------------------------

/// The kind of entity a deadline record is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedKind {
    Project,
    Task,
}

impl TrackedKind {
    /// Value stored in `risk_issues.source_entity_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
        }
    }

    /// Value stored in `notifications.related_entity`.
    pub fn related_entity(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Task => "Task",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Task => "Task",
        }
    }

    pub fn approaching_priority(self) -> Priority {
        match self {
            Self::Project => Priority::High,
            Self::Task => Priority::Medium,
        }
    }

    pub fn missed_priority(self) -> Priority {
        match self {
            Self::Project => Priority::Critical,
            Self::Task => Priority::High,
        }
    }

    pub fn approaching_source(self) -> RiskSourceKind {
        match self {
            Self::Project => RiskSourceKind::ProjectDeadlineApproaching,
            Self::Task => RiskSourceKind::TaskDeadlineApproaching,
        }
    }

    pub fn missed_source(self) -> RiskSourceKind {
        match self {
            Self::Project => RiskSourceKind::ProjectDeadlineMissed,
            Self::Task => RiskSourceKind::TaskDeadlineMissed,
        }
    }

    /// Whether a raw status string means the item is done with.
    pub fn is_terminal_status(self, status: &str) -> bool {
        match self {
            Self::Project => ProjectStatus::from_str_value(status)
                .map(ProjectStatus::is_terminal)
                .unwrap_or(false),
            Self::Task => status == TaskStatus::Completed.as_str(),
        }
    }
}

/// A project or task, reduced to the fields the escalator needs.
#[derive(Debug, Clone)]
pub struct TrackedItem {
    pub kind: TrackedKind,
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub deadline: Option<Timestamp>,
    pub status: String,
    /// Project manager for projects, assignee for tasks.
    pub owner_user_id: Option<DbId>,
}

impl TrackedItem {
    /// Items without a deadline or in a terminal status are never tracked.
    pub fn is_trackable(&self) -> bool {
        self.deadline.is_some() && !self.kind.is_terminal_status(&self.status)
    }

    /// Current phase, or `None` for untrackable items.
    pub fn phase(&self, now: Timestamp) -> Option<DeadlinePhase> {
        if !self.is_trackable() {
            return None;
        }
        self.deadline.map(|deadline| DeadlinePhase::at(deadline, now))
    }
}

// ---------------------------------------------------------------------------
// Escalation planning
// ---------------------------------------------------------------------------

/// The open deadline record already stored for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingRecord {
    pub id: DbId,
    pub source_kind: RiskSourceKind,
}

/// What the escalator must do for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationAction {
    Nothing,
    CreateRisk,
    /// Turn the existing approaching-deadline risk into a missed-deadline issue.
    EscalateInPlace(DbId),
    CreateIssue,
}

/// Decide the action for an item in `phase` given its open deadline record.
///
/// An open record of any kind blocks a new approaching risk: once an item
/// has been escalated, an extended deadline does not reopen a second record
/// while the issue is still open.
pub fn plan(phase: DeadlinePhase, existing: Option<ExistingRecord>) -> EscalationAction {
    match (phase, existing) {
        (DeadlinePhase::Clear, _) => EscalationAction::Nothing,
        (DeadlinePhase::Approaching { .. }, Some(_)) => EscalationAction::Nothing,
        (DeadlinePhase::Approaching { .. }, None) => EscalationAction::CreateRisk,
        (DeadlinePhase::Missed, Some(record)) if record.source_kind.is_missed() => {
            EscalationAction::Nothing
        }
        (DeadlinePhase::Missed, Some(record)) => EscalationAction::EscalateInPlace(record.id),
        (DeadlinePhase::Missed, None) => EscalationAction::CreateIssue,
    }
}

// ---------------------------------------------------------------------------
// Record wording
// ---------------------------------------------------------------------------

/// Field values for a deadline risk/issue row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub record_type: RiskIssueType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub source_kind: RiskSourceKind,
}

fn format_deadline(deadline: Option<Timestamp>) -> String {
    deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "no date".to_string())
}

fn plural_days(days: i64) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

/// Draft for a new approaching-deadline risk.
pub fn draft_risk(item: &TrackedItem, days_left: i64) -> RecordDraft {
    let label = item.kind.label();
    RecordDraft {
        record_type: RiskIssueType::Risk,
        title: format!("{label} deadline approaching: \"{}\"", item.title),
        description: format!(
            "{label} \"{}\" deadline is approaching ({}). {days_left} {} remaining.",
            item.title,
            format_deadline(item.deadline),
            plural_days(days_left),
        ),
        priority: item.kind.approaching_priority(),
        source_kind: item.kind.approaching_source(),
    }
}

/// Draft for a missed-deadline issue, used both for escalation and creation.
pub fn draft_issue(item: &TrackedItem) -> RecordDraft {
    let label = item.kind.label();
    RecordDraft {
        record_type: RiskIssueType::Issue,
        title: format!("{label} deadline missed: \"{}\"", item.title),
        description: format!(
            "{label} \"{}\" missed its deadline ({}).",
            item.title,
            format_deadline(item.deadline),
        ),
        priority: item.kind.missed_priority(),
        source_kind: item.kind.missed_source(),
    }
}

/// Notification text for the owner when a risk is opened.
pub fn risk_notification_message(item: &TrackedItem, days_left: i64) -> String {
    format!(
        "Risk: {} \"{}\" is due in {days_left} {} ({}).",
        item.kind.as_str(),
        item.title,
        plural_days(days_left),
        format_deadline(item.deadline),
    )
}

/// Notification text for the owner when an issue is raised.
pub fn issue_notification_message(item: &TrackedItem) -> String {
    format!(
        "URGENT: {} \"{}\" missed its deadline ({}).",
        item.kind.as_str(),
        item.title,
        format_deadline(item.deadline),
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
    }

    fn project(status: &str, deadline: Option<Timestamp>) -> TrackedItem {
        TrackedItem {
            kind: TrackedKind::Project,
            id: 10,
            project_id: 10,
            title: "Website Relaunch".to_string(),
            deadline,
            status: status.to_string(),
            owner_user_id: Some(3),
        }
    }

    fn task(status: &str, deadline: Option<Timestamp>) -> TrackedItem {
        TrackedItem {
            kind: TrackedKind::Task,
            id: 55,
            project_id: 10,
            title: "Migrate DNS".to_string(),
            deadline,
            status: status.to_string(),
            owner_user_id: None,
        }
    }

    // -- days_until_deadline --------------------------------------------------

    #[test]
    fn partial_days_round_up() {
        assert_eq!(days_until_deadline(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_until_deadline(now() + Duration::hours(25), now()), 2);
        assert_eq!(days_until_deadline(now() + Duration::days(5), now()), 5);
    }

    #[test]
    fn past_deadlines_are_zero_or_negative() {
        assert_eq!(days_until_deadline(now(), now()), 0);
        assert_eq!(days_until_deadline(now() - Duration::hours(3), now()), 0);
        assert_eq!(days_until_deadline(now() - Duration::days(1), now()), -1);
        assert_eq!(days_until_deadline(now() - Duration::hours(36), now()), -1);
    }

    // -- DeadlinePhase --------------------------------------------------------

    #[test]
    fn phase_boundaries() {
        assert_eq!(DeadlinePhase::classify(8), DeadlinePhase::Clear);
        assert_eq!(
            DeadlinePhase::classify(7),
            DeadlinePhase::Approaching { days_left: 7 }
        );
        assert_eq!(
            DeadlinePhase::classify(1),
            DeadlinePhase::Approaching { days_left: 1 }
        );
        assert_eq!(DeadlinePhase::classify(0), DeadlinePhase::Missed);
        assert_eq!(DeadlinePhase::classify(-12), DeadlinePhase::Missed);
    }

    // -- TrackedItem ----------------------------------------------------------

    #[test]
    fn completed_or_undated_projects_are_not_tracked() {
        let soon = Some(now() + Duration::days(2));
        assert!(project("in_progress", soon).is_trackable());
        assert!(!project("completed", soon).is_trackable());
        assert!(!project("rejected", soon).is_trackable());
        assert!(!project("cancelled", soon).is_trackable());
        assert!(!project("in_progress", None).is_trackable());
        assert_eq!(project("completed", soon).phase(now()), None);
    }

    #[test]
    fn completed_tasks_are_not_tracked() {
        let past = Some(now() - Duration::days(2));
        assert!(task("on_hold", past).is_trackable());
        assert!(!task("completed", past).is_trackable());
    }

    #[test]
    fn phase_of_trackable_item() {
        let item = project("planning", Some(now() + Duration::days(5)));
        assert_eq!(
            item.phase(now()),
            Some(DeadlinePhase::Approaching { days_left: 5 })
        );
    }

    // -- plan -----------------------------------------------------------------

    #[test]
    fn approaching_without_record_creates_risk() {
        let phase = DeadlinePhase::Approaching { days_left: 5 };
        assert_eq!(plan(phase, None), EscalationAction::CreateRisk);
    }

    #[test]
    fn approaching_with_record_is_idempotent() {
        let phase = DeadlinePhase::Approaching { days_left: 5 };
        let existing = ExistingRecord {
            id: 1,
            source_kind: RiskSourceKind::ProjectDeadlineApproaching,
        };
        assert_eq!(plan(phase, Some(existing)), EscalationAction::Nothing);
    }

    #[test]
    fn missed_escalates_existing_risk_in_place() {
        let existing = ExistingRecord {
            id: 77,
            source_kind: RiskSourceKind::TaskDeadlineApproaching,
        };
        assert_matches!(
            plan(DeadlinePhase::Missed, Some(existing)),
            EscalationAction::EscalateInPlace(77)
        );
    }

    #[test]
    fn missed_with_issue_is_idempotent() {
        let existing = ExistingRecord {
            id: 77,
            source_kind: RiskSourceKind::ProjectDeadlineMissed,
        };
        assert_eq!(
            plan(DeadlinePhase::Missed, Some(existing)),
            EscalationAction::Nothing
        );
    }

    #[test]
    fn missed_without_warning_creates_issue() {
        assert_eq!(
            plan(DeadlinePhase::Missed, None),
            EscalationAction::CreateIssue
        );
    }

    #[test]
    fn clear_does_nothing() {
        assert_eq!(plan(DeadlinePhase::Clear, None), EscalationAction::Nothing);
    }

    // -- drafts ---------------------------------------------------------------

    #[test]
    fn project_risk_draft() {
        let item = project("in_progress", Some(now() + Duration::days(5)));
        let draft = draft_risk(&item, 5);
        assert_eq!(draft.record_type, RiskIssueType::Risk);
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.source_kind, RiskSourceKind::ProjectDeadlineApproaching);
        assert!(draft.description.contains("approaching"));
        assert!(draft.description.contains("2026-05-09"));
    }

    #[test]
    fn task_drafts_quote_the_title() {
        let item = task("todo", Some(now() - Duration::days(1)));
        let risk = draft_risk(&item, 1);
        assert_eq!(risk.priority, Priority::Medium);
        assert!(risk.description.contains("\"Migrate DNS\""));
        assert!(risk.description.contains("1 day remaining"));

        let issue = draft_issue(&item);
        assert_eq!(issue.record_type, RiskIssueType::Issue);
        assert_eq!(issue.priority, Priority::High);
        assert!(issue.description.contains("\"Migrate DNS\""));
    }

    #[test]
    fn project_issue_draft_is_critical() {
        let item = project("in_progress", Some(now() - Duration::days(1)));
        let draft = draft_issue(&item);
        assert_eq!(draft.priority, Priority::Critical);
        assert_eq!(draft.source_kind, RiskSourceKind::ProjectDeadlineMissed);
        assert!(draft.description.contains("missed its deadline"));
    }

    #[test]
    fn issue_notification_is_urgent() {
        let item = project("in_progress", Some(now() - Duration::days(1)));
        let message = issue_notification_message(&item);
        assert!(message.starts_with("URGENT"));
        assert!(message.contains("Website Relaunch"));
    }
}
