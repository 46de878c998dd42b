//! Milestone progress recomputation.
//!
//! Called after any mutation that can change a milestone's inputs: a link
//! created, re-weighted or deleted, a linked task changing status, or the
//! milestone's own deadline moving. The result is written through
//! [`MilestoneRepo::set_progress`], which touches only the derived columns.

use chrono::Utc;
use pulse_core::milestone_progress::{evaluate, LinkedTask};
use pulse_core::types::{DbId, Timestamp};
use pulse_db::models::milestone::Milestone;
use pulse_db::repositories::{MilestoneRepo, TaskMilestoneRepo};
use sqlx::PgPool;

/// Recompute and persist one milestone's completion percentage and status.
///
/// Returns `None` if the milestone does not exist.
pub async fn recalculate_milestone(
    pool: &PgPool,
    milestone_id: DbId,
    now: Timestamp,
) -> Result<Option<Milestone>, sqlx::Error> {
    let Some(milestone) = MilestoneRepo::find_by_id(pool, milestone_id).await? else {
        return Ok(None);
    };

    let rows = TaskMilestoneRepo::list_progress_inputs(pool, milestone_id).await?;
    for row in rows.iter().filter(|row| row.task_status.is_none()) {
        tracing::warn!(
            milestone_id,
            link_id = row.link_id,
            task_id = row.task_id,
            "Linked task not found, counting it as not started"
        );
    }

    let links: Vec<LinkedTask<'_>> = rows
        .iter()
        .map(|row| LinkedTask {
            task_status: row.task_status.as_deref(),
            weight: row.weight,
        })
        .collect();
    let progress = evaluate(&links, milestone.deadline, now);

    let updated = MilestoneRepo::set_progress(
        pool,
        milestone_id,
        i16::from(progress.completion_percentage),
        progress.status.as_str(),
    )
    .await?;

    tracing::info!(
        milestone_id,
        links = links.len(),
        completion = progress.completion_percentage,
        status = %progress.status,
        "Milestone progress recalculated"
    );
    Ok(updated)
}

/// Outcome of recomputing every milestone linked to one task.
#[derive(Debug, Default)]
pub struct TaskRecalculation {
    pub updated: Vec<Milestone>,
    /// Milestones whose recomputation failed and was skipped.
    pub failed: usize,
}

/// Recompute every milestone the task is linked to.
///
/// A milestone that fails is logged and counted; the rest are still
/// recomputed. Only loading the task's links can fail the whole call.
pub async fn recalculate_for_task(
    pool: &PgPool,
    task_id: DbId,
    now: Timestamp,
) -> Result<TaskRecalculation, sqlx::Error> {
    let milestone_ids = TaskMilestoneRepo::milestone_ids_for_task(pool, task_id).await?;
    let mut outcome = TaskRecalculation {
        updated: Vec::with_capacity(milestone_ids.len()),
        failed: 0,
    };
    for milestone_id in milestone_ids {
        match recalculate_milestone(pool, milestone_id, now).await {
            Ok(Some(milestone)) => outcome.updated.push(milestone),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    task_id,
                    milestone_id,
                    error = %e,
                    "Failed to recalculate milestone progress"
                );
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

/// Recompute a milestone after a mutation has already been committed.
///
/// Errors are logged and dropped so the triggering request still succeeds.
pub async fn refresh_milestone(pool: &PgPool, milestone_id: DbId) {
    if let Err(e) = recalculate_milestone(pool, milestone_id, Utc::now()).await {
        tracing::error!(milestone_id, error = %e, "Failed to recalculate milestone progress");
    }
}

/// Recompute a task's milestones after its status changed. Errors are logged.
pub async fn refresh_for_task(pool: &PgPool, task_id: DbId) {
    match recalculate_for_task(pool, task_id, Utc::now()).await {
        Ok(outcome) if outcome.failed > 0 => tracing::warn!(
            task_id,
            updated = outcome.updated.len(),
            failed = outcome.failed,
            "Some milestones were not recalculated"
        ),
        Ok(_) => {}
        Err(e) => tracing::error!(task_id, error = %e, "Failed to recalculate milestones for task"),
    }
}
