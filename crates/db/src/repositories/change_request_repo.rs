//! Repository for the `change_requests` table.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::change_request::{ChangeRequest, CreateChangeRequest};

const COLUMNS: &str = "id, project_id, requested_by_user_id, reason, proposed_status, \
     proposed_deadline, proposed_budget, status, reviewed_by_user_id, reviewed_at, \
     review_comment, created_at, updated_at";

/// Provides CRUD operations for change requests.
pub struct ChangeRequestRepo;

impl ChangeRequestRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        requested_by_user_id: Option<DbId>,
        input: &CreateChangeRequest,
    ) -> Result<ChangeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_requests
                (project_id, requested_by_user_id, reason, proposed_status,
                 proposed_deadline, proposed_budget)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(project_id)
            .bind(requested_by_user_id)
            .bind(&input.reason)
            .bind(&input.proposed_status)
            .bind(input.proposed_deadline)
            .bind(input.proposed_budget)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_requests WHERE id = $1");
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_requests WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Record a review decision on a pending request.
    ///
    /// Returns `None` if the request does not exist or was already reviewed.
    pub async fn mark_reviewed(
        pool: &PgPool,
        id: DbId,
        status: &str,
        reviewed_by_user_id: DbId,
        comment: Option<&str>,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE change_requests SET
                status = $2,
                reviewed_by_user_id = $3,
                reviewed_at = NOW(),
                review_comment = $4
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reviewed_by_user_id)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }
}
