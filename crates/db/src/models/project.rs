//! Project entity model and DTOs.

use chrono::NaiveDate;
use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub budget: f64,
    pub actual_cost: f64,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<Timestamp>,
    pub department_id: Option<DbId>,
    pub manager_user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
///
/// The initial status is decided by the caller's role, so `status` is only
/// honoured for roles that may skip approval.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<Timestamp>,
    pub department_id: Option<DbId>,
    pub manager_user_id: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0))]
    pub actual_cost: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<Timestamp>,
    pub department_id: Option<DbId>,
    pub manager_user_id: Option<DbId>,
}

/// An active project with no weekly update for a given week.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectMissingUpdate {
    pub project_id: DbId,
    pub title: String,
    pub manager_user_id: DbId,
    pub department_id: Option<DbId>,
}
