//! Repository for the `departments` table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::department::{CreateDepartment, Department, UpdateDepartment};

const COLUMNS: &str = "id, name, director_user_id, secondary_pmo_user_id, created_at, updated_at";

/// Provides CRUD operations for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDepartment,
    ) -> Result<Department, sqlx::Error> {
        let query = format!(
            "INSERT INTO departments (name, director_user_id, secondary_pmo_user_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(&input.name)
            .bind(input.director_user_id)
            .bind(input.secondary_pmo_user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all departments ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments ORDER BY name");
        sqlx::query_as::<_, Department>(&query).fetch_all(pool).await
    }

    /// Update a department. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDepartment,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!(
            "UPDATE departments SET
                name = COALESCE($2, name),
                director_user_id = COALESCE($3, director_user_id),
                secondary_pmo_user_id = COALESCE($4, secondary_pmo_user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.director_user_id)
            .bind(input.secondary_pmo_user_id)
            .fetch_optional(pool)
            .await
    }
}
