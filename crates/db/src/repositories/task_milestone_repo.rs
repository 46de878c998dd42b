//! Repository for the `task_milestones` link table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::milestone::{MilestoneLinkRow, TaskMilestone};

const COLUMNS: &str = "id, task_id, milestone_id, weight, created_at, updated_at";

/// Provides CRUD operations for task-milestone links.
pub struct TaskMilestoneRepo;

impl TaskMilestoneRepo {
    /// Link a task to a milestone. A `None` weight is stored as 1.
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        milestone_id: DbId,
        weight: Option<f64>,
    ) -> Result<TaskMilestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_milestones (task_id, milestone_id, weight)
             VALUES ($1, $2, COALESCE($3, 1))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(task_id)
            .bind(milestone_id)
            .bind(weight)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskMilestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_milestones WHERE id = $1");
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_milestone(
        pool: &PgPool,
        milestone_id: DbId,
    ) -> Result<Vec<TaskMilestone>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM task_milestones WHERE milestone_id = $1 ORDER BY id");
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(milestone_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskMilestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_milestones WHERE task_id = $1 ORDER BY id");
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a link's weight. A `None` weight resets it to 1.
    pub async fn update_weight(
        pool: &PgPool,
        id: DbId,
        weight: Option<f64>,
    ) -> Result<Option<TaskMilestone>, sqlx::Error> {
        let query = format!(
            "UPDATE task_milestones SET weight = COALESCE($2, 1)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(id)
            .bind(weight)
            .fetch_optional(pool)
            .await
    }

    /// Delete a link, returning the removed row so its milestone can be recomputed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<TaskMilestone>, sqlx::Error> {
        let query = format!("DELETE FROM task_milestones WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, TaskMilestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A milestone's links joined to their tasks' current status.
    pub async fn list_progress_inputs(
        pool: &PgPool,
        milestone_id: DbId,
    ) -> Result<Vec<MilestoneLinkRow>, sqlx::Error> {
        sqlx::query_as::<_, MilestoneLinkRow>(
            "SELECT tm.id AS link_id, tm.task_id, tm.weight, t.status AS task_status
             FROM task_milestones tm
             LEFT JOIN tasks t ON t.id = tm.task_id
             WHERE tm.milestone_id = $1
             ORDER BY tm.id",
        )
        .bind(milestone_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of every milestone a task is linked to.
    pub async fn milestone_ids_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT milestone_id FROM task_milestones WHERE task_id = $1 ORDER BY milestone_id",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
