//! Risk/issue entity model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `risk_issues` table.
///
/// Deadline records raised by the escalator carry `source_kind` and
/// `source_entity_*`; records entered by people leave them `NULL`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RiskIssue {
    pub id: DbId,
    pub project_id: DbId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub record_type: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub created_by_user_id: Option<DbId>,
    pub source_kind: Option<String>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for manually recording a risk or issue.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRiskIssue {
    /// `risk` or `issue`. Defaults to `risk`.
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// DTO for updating a risk or issue. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRiskIssue {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

/// Insert payload for a deadline record raised by the escalator.
#[derive(Debug, Clone)]
pub struct NewDeadlineRecord<'a> {
    pub project_id: DbId,
    pub record_type: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub priority: &'a str,
    pub source_kind: &'a str,
    pub source_entity_type: &'a str,
    pub source_entity_id: DbId,
}

/// Field changes applied when a risk is escalated to an issue.
#[derive(Debug, Clone)]
pub struct DeadlineEscalation<'a> {
    pub expected_source_kind: &'a str,
    pub record_type: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub priority: &'a str,
    pub source_kind: &'a str,
}
