//! Repository for the `risk_issues` table.
//!
//! Deadline records are keyed by `(source_entity_type, source_entity_id)`.
//! The partial unique index `uq_risk_issues_open_source` allows at most one
//! open deadline record per tracked item, and every write below that touches
//! deadline records is conditional so concurrent sweeps cannot duplicate work.

use pulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::risk_issue::{
    CreateRiskIssue, DeadlineEscalation, NewDeadlineRecord, RiskIssue, UpdateRiskIssue,
};

const COLUMNS: &str = "id, project_id, type, title, description, priority, status, \
     created_by_user_id, source_kind, source_entity_type, source_entity_id, created_at, updated_at";

/// Predicate identifying open deadline records. Must match the partial index.
const OPEN_SOURCE_PREDICATE: &str =
    "source_kind IS NOT NULL AND status IN ('open', 'in_progress')";

/// Provides CRUD operations for risks and issues.
pub struct RiskIssueRepo;

impl RiskIssueRepo {
    /// Insert a manually recorded risk or issue.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by_user_id: Option<DbId>,
        input: &CreateRiskIssue,
    ) -> Result<RiskIssue, sqlx::Error> {
        let query = format!(
            "INSERT INTO risk_issues (project_id, type, title, description, priority, created_by_user_id)
             VALUES ($1, COALESCE($2, 'risk'), $3, $4, COALESCE($5, 'medium'), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(project_id)
            .bind(&input.record_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(created_by_user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RiskIssue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM risk_issues WHERE id = $1");
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Risks and issues of a project, newest first, optionally filtered by type.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        record_type: Option<&str>,
    ) -> Result<Vec<RiskIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risk_issues
             WHERE project_id = $1 AND ($2::TEXT IS NULL OR type = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(project_id)
            .bind(record_type)
            .fetch_all(pool)
            .await
    }

    /// Update a risk or issue. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRiskIssue,
    ) -> Result<Option<RiskIssue>, sqlx::Error> {
        let query = format!(
            "UPDATE risk_issues SET
                type = COALESCE($2, type),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(id)
            .bind(&input.record_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// The open deadline record for a tracked project or task, if any.
    pub async fn find_open_for_source(
        pool: &PgPool,
        source_entity_type: &str,
        source_entity_id: DbId,
    ) -> Result<Option<RiskIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risk_issues
             WHERE source_entity_type = $1 AND source_entity_id = $2
               AND {OPEN_SOURCE_PREDICATE}"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(source_entity_type)
            .bind(source_entity_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a deadline record unless an open one already exists for the item.
    ///
    /// Returns `None` when another writer got there first.
    pub async fn insert_deadline_record(
        pool: &PgPool,
        record: &NewDeadlineRecord<'_>,
    ) -> Result<Option<RiskIssue>, sqlx::Error> {
        let query = format!(
            "INSERT INTO risk_issues
                (project_id, type, title, description, priority, status,
                 source_kind, source_entity_type, source_entity_id)
             VALUES ($1, $2, $3, $4, $5, 'open', $6, $7, $8)
             ON CONFLICT (source_entity_type, source_entity_id)
                WHERE {OPEN_SOURCE_PREDICATE}
                DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(record.project_id)
            .bind(record.record_type)
            .bind(record.title)
            .bind(record.description)
            .bind(record.priority)
            .bind(record.source_kind)
            .bind(record.source_entity_type)
            .bind(record.source_entity_id)
            .fetch_optional(pool)
            .await
    }

    /// Turn an open approaching-deadline risk into an issue, keeping its id.
    ///
    /// Only applies while the row still carries `expected_source_kind` and is
    /// open. Returns `None` if the row was already escalated or closed.
    pub async fn escalate(
        pool: &PgPool,
        id: DbId,
        change: &DeadlineEscalation<'_>,
    ) -> Result<Option<RiskIssue>, sqlx::Error> {
        let query = format!(
            "UPDATE risk_issues SET
                type = $3,
                title = $4,
                description = $5,
                priority = $6,
                source_kind = $7
             WHERE id = $1 AND source_kind = $2 AND status IN ('open', 'in_progress')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RiskIssue>(&query)
            .bind(id)
            .bind(change.expected_source_kind)
            .bind(change.record_type)
            .bind(change.title)
            .bind(change.description)
            .bind(change.priority)
            .bind(change.source_kind)
            .fetch_optional(pool)
            .await
    }
}
