//! Task entity model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub deadline: Option<Timestamp>,
    pub assigned_user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. The project comes from the URL path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo` if omitted.
    pub status: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<String>,
    pub deadline: Option<Timestamp>,
    pub assigned_user_id: Option<DbId>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<Timestamp>,
    pub assigned_user_id: Option<DbId>,
}
