//! Repository for the `projects` table.

use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectMissingUpdate, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, priority, budget, actual_cost, \
     start_date, deadline, department_id, manager_user_id, created_at, updated_at";

/// Statuses in which a project owes weekly updates.
const REPORTING_STATUSES: &str = "'planning', 'in_progress', 'on_hold'";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with the given initial status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        status: &str,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (title, description, status, priority, budget, start_date, deadline,
                 department_id, manager_user_id)
             VALUES ($1, $2, $3, COALESCE($4, 'medium'), COALESCE($5, 0), $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(status)
            .bind(&input.priority)
            .bind(input.budget)
            .bind(input.start_date)
            .bind(input.deadline)
            .bind(input.department_id)
            .bind(input.manager_user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, most recently created first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every project in id order. Used by the deadline sweep.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY id");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                budget = COALESCE($6, budget),
                actual_cost = COALESCE($7, actual_cost),
                start_date = COALESCE($8, start_date),
                deadline = COALESCE($9, deadline),
                department_id = COALESCE($10, department_id),
                manager_user_id = COALESCE($11, manager_user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.budget)
            .bind(input.actual_cost)
            .bind(input.start_date)
            .bind(input.deadline)
            .bind(input.department_id)
            .bind(input.manager_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a project from `from` to `to`.
    ///
    /// Returns `None` if the project does not exist or is no longer in `from`,
    /// so two concurrent reviewers cannot both act on the same project.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Apply the non-`None` parts of an approved change request.
    pub async fn apply_change(
        pool: &PgPool,
        id: DbId,
        status: Option<&str>,
        deadline: Option<Timestamp>,
        budget: Option<f64>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = COALESCE($2, status),
                deadline = COALESCE($3, deadline),
                budget = COALESCE($4, budget)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status)
            .bind(deadline)
            .bind(budget)
            .fetch_optional(pool)
            .await
    }

    /// Active projects with a manager but no weekly update for `(year, week_number)`.
    pub async fn list_missing_weekly_update(
        pool: &PgPool,
        year: i32,
        week_number: i32,
    ) -> Result<Vec<ProjectMissingUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT p.id AS project_id, p.title, p.manager_user_id, p.department_id
             FROM projects p
             WHERE p.status IN ({REPORTING_STATUSES})
               AND p.manager_user_id IS NOT NULL
               AND NOT EXISTS (
                   SELECT 1 FROM weekly_updates w
                   WHERE w.project_id = p.id AND w.year = $1 AND w.week_number = $2
               )
             ORDER BY p.id"
        );
        sqlx::query_as::<_, ProjectMissingUpdate>(&query)
            .bind(year)
            .bind(week_number)
            .fetch_all(pool)
            .await
    }
}
