//! Milestone completion aggregation.
//!
//! A milestone's completion percentage is never set by clients. It is the
//! weight-normalized average of its linked tasks' completion values, and its
//! status is derived from that percentage plus deadline proximity. The
//! functions here are pure; `pulse-api` loads the links and persists the
//! result.

use chrono::Duration;
use serde::Serialize;

use crate::status::{MilestoneStatus, TaskStatus};
use crate::types::Timestamp;

/// A milestone whose deadline is this close is at risk when behind.
pub const AT_RISK_WINDOW_DAYS: i64 = 3;

/// Completion below this is "behind" inside the at-risk window.
pub const AT_RISK_COMPLETION_THRESHOLD: u8 = 75;

/// Weight used when a link has no usable weight.
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// One task-milestone link as seen by the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct LinkedTask<'a> {
    /// Status of the linked task, `None` when the task row could not be resolved.
    pub task_status: Option<&'a str>,
    /// Stored link weight.
    pub weight: Option<f64>,
}

/// Result of evaluating a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneProgress {
    pub completion_percentage: u8,
    pub status: MilestoneStatus,
}

/// Completion value contributed by a task in the given status.
pub fn task_status_completion(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Completed => 100,
        TaskStatus::Review => 90,
        TaskStatus::InProgress => 50,
        TaskStatus::OnHold => 25,
        TaskStatus::Todo => 0,
    }
}

/// Completion value for a raw status string. Unknown statuses count as 0.
pub fn task_completion_value(status: &str) -> u8 {
    TaskStatus::from_str_value(status)
        .map(task_status_completion)
        .unwrap_or(0)
}

/// Weight actually used for a link.
///
/// Missing, zero, negative and non-finite weights fall back to
/// [`DEFAULT_LINK_WEIGHT`], which keeps the average inside 0..=100.
pub fn effective_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => DEFAULT_LINK_WEIGHT,
    }
}

/// Weight-normalized completion percentage over a milestone's links.
///
/// Unresolved tasks still count toward the total weight but contribute
/// nothing, so a dangling link drags the percentage down rather than
/// silently inflating it. An empty slice yields 0.
pub fn compute_completion(links: &[LinkedTask<'_>]) -> u8 {
    if links.is_empty() {
        return 0;
    }

    let total_weight: f64 = links.iter().map(|l| effective_weight(l.weight)).sum();

    let weighted_sum: f64 = links
        .iter()
        .filter_map(|link| {
            let status = link.task_status?;
            let value = f64::from(task_completion_value(status));
            Some(value * effective_weight(link.weight) / total_weight)
        })
        .sum();

    weighted_sum.round().clamp(0.0, 100.0) as u8
}

/// Derive a milestone status. The first matching rule wins:
///
/// 1. past deadline and not complete: `Delayed`
/// 2. deadline within [`AT_RISK_WINDOW_DAYS`] and below
///    [`AT_RISK_COMPLETION_THRESHOLD`]: `AtRisk`
/// 3. 0 %: `NotStarted`
/// 4. 100 %: `Completed`
/// 5. otherwise `InProgress`
pub fn derive_status(
    completion_percentage: u8,
    deadline: Option<Timestamp>,
    now: Timestamp,
) -> MilestoneStatus {
    if let Some(deadline) = deadline {
        if now > deadline && completion_percentage < 100 {
            return MilestoneStatus::Delayed;
        }
        if deadline - now <= Duration::days(AT_RISK_WINDOW_DAYS)
            && completion_percentage < AT_RISK_COMPLETION_THRESHOLD
        {
            return MilestoneStatus::AtRisk;
        }
    }

    match completion_percentage {
        0 => MilestoneStatus::NotStarted,
        pct if pct >= 100 => MilestoneStatus::Completed,
        _ => MilestoneStatus::InProgress,
    }
}

/// Compute both the percentage and the status for a milestone.
pub fn evaluate(
    links: &[LinkedTask<'_>],
    deadline: Option<Timestamp>,
    now: Timestamp,
) -> MilestoneProgress {
    let completion_percentage = compute_completion(links);
    MilestoneProgress {
        completion_percentage,
        status: derive_status(completion_percentage, deadline, now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn link(status: &str, weight: f64) -> LinkedTask<'_> {
        LinkedTask {
            task_status: Some(status),
            weight: Some(weight),
        }
    }

    // -- completion values ----------------------------------------------------

    #[test]
    fn status_completion_table() {
        assert_eq!(task_completion_value("completed"), 100);
        assert_eq!(task_completion_value("review"), 90);
        assert_eq!(task_completion_value("in_progress"), 50);
        assert_eq!(task_completion_value("on_hold"), 25);
        assert_eq!(task_completion_value("todo"), 0);
        assert_eq!(task_completion_value("archived"), 0);
    }

    #[test]
    fn unusable_weights_default_to_one() {
        assert_eq!(effective_weight(None), 1.0);
        assert_eq!(effective_weight(Some(0.0)), 1.0);
        assert_eq!(effective_weight(Some(-4.0)), 1.0);
        assert_eq!(effective_weight(Some(f64::NAN)), 1.0);
        assert_eq!(effective_weight(Some(2.5)), 2.5);
    }

    // -- compute_completion ---------------------------------------------------

    #[test]
    fn weights_normalize_the_average() {
        let links = [link("completed", 2.0), link("todo", 1.0)];
        assert_eq!(compute_completion(&links), 67);
    }

    #[test]
    fn review_and_on_hold_weighted_scenario() {
        let links = [link("review", 3.0), link("on_hold", 1.0)];
        assert_eq!(compute_completion(&links), 74);
    }

    #[test]
    fn empty_milestone_is_zero() {
        assert_eq!(compute_completion(&[]), 0);
    }

    #[test]
    fn unresolved_task_counts_weight_but_not_completion() {
        let links = [
            link("completed", 1.0),
            LinkedTask {
                task_status: None,
                weight: Some(1.0),
            },
        ];
        assert_eq!(compute_completion(&links), 50);
    }

    #[test]
    fn all_completed_is_one_hundred() {
        let links = [link("completed", 5.0), link("completed", 0.0)];
        assert_eq!(compute_completion(&links), 100);
    }

    #[test]
    fn missing_weights_are_equal_weights() {
        let links = [
            LinkedTask {
                task_status: Some("in_progress"),
                weight: None,
            },
            LinkedTask {
                task_status: Some("completed"),
                weight: None,
            },
        ];
        assert_eq!(compute_completion(&links), 75);
    }

    // -- derive_status --------------------------------------------------------

    #[test]
    fn past_deadline_beats_in_progress() {
        let deadline = now() - Duration::days(1);
        assert_eq!(
            derive_status(50, Some(deadline), now()),
            MilestoneStatus::Delayed
        );
    }

    #[test]
    fn past_deadline_but_complete_is_completed() {
        let deadline = now() - Duration::days(1);
        assert_eq!(
            derive_status(100, Some(deadline), now()),
            MilestoneStatus::Completed
        );
    }

    #[test]
    fn close_deadline_and_behind_is_at_risk() {
        let deadline = now() + Duration::days(2);
        assert_eq!(
            derive_status(74, Some(deadline), now()),
            MilestoneStatus::AtRisk
        );
        assert_eq!(
            derive_status(0, Some(deadline), now()),
            MilestoneStatus::AtRisk
        );
    }

    #[test]
    fn at_risk_window_is_inclusive() {
        let deadline = now() + Duration::days(AT_RISK_WINDOW_DAYS);
        assert_eq!(
            derive_status(10, Some(deadline), now()),
            MilestoneStatus::AtRisk
        );
    }

    #[test]
    fn close_deadline_but_on_track_is_in_progress() {
        let deadline = now() + Duration::days(2);
        assert_eq!(
            derive_status(75, Some(deadline), now()),
            MilestoneStatus::InProgress
        );
    }

    #[test]
    fn distant_or_missing_deadline_uses_percentage() {
        let far = Some(now() + Duration::days(30));
        assert_eq!(derive_status(0, far, now()), MilestoneStatus::NotStarted);
        assert_eq!(derive_status(100, None, now()), MilestoneStatus::Completed);
        assert_eq!(derive_status(42, None, now()), MilestoneStatus::InProgress);
    }

    // -- evaluate -------------------------------------------------------------

    #[test]
    fn empty_milestone_without_pressure_is_not_started() {
        let progress = evaluate(&[], Some(now() + Duration::days(10)), now());
        assert_eq!(
            progress,
            MilestoneProgress {
                completion_percentage: 0,
                status: MilestoneStatus::NotStarted,
            }
        );
    }

    #[test]
    fn weighted_scenario_far_deadline_is_in_progress() {
        let links = [link("review", 3.0), link("on_hold", 1.0)];
        let progress = evaluate(&links, Some(now() + Duration::days(60)), now());
        assert_eq!(progress.completion_percentage, 74);
        assert_eq!(progress.status, MilestoneStatus::InProgress);
    }
}
