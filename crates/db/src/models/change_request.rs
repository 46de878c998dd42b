//! Change request model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `change_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeRequest {
    pub id: DbId,
    pub project_id: DbId,
    pub requested_by_user_id: Option<DbId>,
    pub reason: String,
    pub proposed_status: Option<String>,
    pub proposed_deadline: Option<Timestamp>,
    pub proposed_budget: Option<f64>,
    pub status: String,
    pub reviewed_by_user_id: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for proposing a change to a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChangeRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    pub proposed_status: Option<String>,
    pub proposed_deadline: Option<Timestamp>,
    #[validate(range(min = 0.0))]
    pub proposed_budget: Option<f64>,
}

impl CreateChangeRequest {
    /// Whether the request proposes anything at all.
    pub fn has_proposal(&self) -> bool {
        self.proposed_status.is_some()
            || self.proposed_deadline.is_some()
            || self.proposed_budget.is_some()
    }
}

/// DTO for approving or rejecting a change request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewChangeRequest {
    pub comment: Option<String>,
}
