//! Weekly status update model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `weekly_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeeklyUpdate {
    pub id: DbId,
    pub project_id: DbId,
    pub submitted_by_user_id: Option<DbId>,
    pub year: i32,
    pub week_number: i32,
    pub summary: String,
    pub accomplishments: Option<String>,
    pub next_steps: Option<String>,
    pub blockers: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a weekly update.
///
/// `year` and `week_number` default to the current reporting week.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWeeklyUpdate {
    #[validate(length(min = 1))]
    pub summary: String,
    pub accomplishments: Option<String>,
    pub next_steps: Option<String>,
    pub blockers: Option<String>,
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 54))]
    pub week_number: Option<i32>,
}
