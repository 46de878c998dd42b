//! Repository for the `weekly_updates` table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::weekly_update::{CreateWeeklyUpdate, WeeklyUpdate};

const COLUMNS: &str = "id, project_id, submitted_by_user_id, year, week_number, summary, \
     accomplishments, next_steps, blockers, created_at, updated_at";

/// Provides CRUD operations for weekly updates.
pub struct WeeklyUpdateRepo;

impl WeeklyUpdateRepo {
    /// Insert the update for `(year, week_number)`.
    ///
    /// A second submission for the same week violates
    /// `uq_weekly_updates_project_week`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        submitted_by_user_id: Option<DbId>,
        year: i32,
        week_number: i32,
        input: &CreateWeeklyUpdate,
    ) -> Result<WeeklyUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO weekly_updates
                (project_id, submitted_by_user_id, year, week_number, summary,
                 accomplishments, next_steps, blockers)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeeklyUpdate>(&query)
            .bind(project_id)
            .bind(submitted_by_user_id)
            .bind(year)
            .bind(week_number)
            .bind(&input.summary)
            .bind(&input.accomplishments)
            .bind(&input.next_steps)
            .bind(&input.blockers)
            .fetch_one(pool)
            .await
    }

    /// Updates of a project, most recent week first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<WeeklyUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM weekly_updates
             WHERE project_id = $1
             ORDER BY year DESC, week_number DESC"
        );
        sqlx::query_as::<_, WeeklyUpdate>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
