//! Department entity model and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub director_user_id: Option<DbId>,
    pub secondary_pmo_user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a department.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDepartment {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub director_user_id: Option<DbId>,
    pub secondary_pmo_user_id: Option<DbId>,
}

/// DTO for updating a department. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDepartment {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub director_user_id: Option<DbId>,
    pub secondary_pmo_user_id: Option<DbId>,
}
