//! Milestone and task-milestone link models and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `milestones` table.
///
/// `completion_percentage` and `status` are derived from the linked tasks
/// and are only written by the progress aggregator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    pub completion_percentage: i16,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a milestone. Progress always starts at zero.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMilestone {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
}

/// DTO for updating a milestone's descriptive fields.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMilestone {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the deadline.
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub deadline: Option<Option<Timestamp>>,
}

/// A row from the `task_milestones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskMilestone {
    pub id: DbId,
    pub task_id: DbId,
    pub milestone_id: DbId,
    pub weight: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for linking a task to a milestone. The task comes from the URL path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskMilestone {
    pub milestone_id: DbId,
    /// Defaults to 1 if omitted.
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

/// DTO for changing a link's weight.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskMilestone {
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

/// One link of a milestone joined to its task, as consumed by the aggregator.
///
/// `task_status` is `None` when the linked task row no longer resolves.
#[derive(Debug, Clone, FromRow)]
pub struct MilestoneLinkRow {
    pub link_id: DbId,
    pub task_id: DbId,
    pub weight: Option<f64>,
    pub task_status: Option<String>,
}
