//! Repository for the `milestones` table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::milestone::{CreateMilestone, Milestone, UpdateMilestone};

const COLUMNS: &str = "id, project_id, title, description, deadline, completion_percentage, \
     status, created_at, updated_at";

/// Provides CRUD operations for milestones.
pub struct MilestoneRepo;

impl MilestoneRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateMilestone,
    ) -> Result<Milestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones (project_id, title, description, deadline)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.deadline)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = $1");
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Milestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones WHERE project_id = $1 ORDER BY deadline NULLS LAST, id"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update descriptive fields. Progress columns are left untouched.
    ///
    /// `deadline` is only written when the outer `Option` is `Some`, so a
    /// patch can clear it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMilestone,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = CASE WHEN $4 THEN $5 ELSE deadline END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.deadline.is_some())
            .bind(input.deadline.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Persist derived progress. Writes only the two derived columns.
    pub async fn set_progress(
        pool: &PgPool,
        id: DbId,
        completion_percentage: i16,
        status: &str,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET completion_percentage = $2, status = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(completion_percentage)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
