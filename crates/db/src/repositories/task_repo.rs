//! Repository for the `tasks` table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, UpdateTask};

const COLUMNS: &str = "id, project_id, title, description, status, priority, deadline, \
     assigned_user_id, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task under `project_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, priority, deadline, assigned_user_id)
             VALUES ($1, $2, $3, COALESCE($4, 'todo'), COALESCE($5, 'medium'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.deadline)
            .bind(input.assigned_user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tasks of a project in id order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                deadline = COALESCE($6, deadline),
                assigned_user_id = COALESCE($7, assigned_user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.deadline)
            .bind(input.assigned_user_id)
            .fetch_optional(pool)
            .await
    }
}
