//! Handlers for the `/admin` resource: departments, users and job triggers.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pulse_core::error::CoreError;
use pulse_core::roles::validate_role;
use pulse_core::types::DbId;
use pulse_db::models::department::{CreateDepartment, Department, UpdateDepartment};
use pulse_db::models::user::{CreateUser, UpdateUser, UserResponse};
use pulse_db::repositories::{DepartmentRepo, UserRepo};
use pulse_db::{clamp_limit, clamp_offset};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::engine::deadline_escalator::{run_sweep, SweepSummary};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/departments
pub async fn create_department(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateDepartment>,
) -> AppResult<(StatusCode, Json<Department>)> {
    input.validate()?;
    let department = DepartmentRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// GET /api/v1/admin/departments
pub async fn list_departments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Department>>>> {
    let departments = DepartmentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: departments }))
}

/// GET /api/v1/admin/departments/{id}
pub async fn get_department(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<Department>> {
    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Department", id))?;
    Ok(Json(department))
}

/// PUT /api/v1/admin/departments/{id}
pub async fn update_department(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDepartment>,
) -> AppResult<Json<Department>> {
    input.validate()?;
    let department = DepartmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Department", id))?;
    Ok(Json(department))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub role: String,
    pub department_id: Option<DbId>,
}

/// POST /api/v1/admin/users
///
/// Create a user. The password is strength-checked and stored as an
/// Argon2id hash; the response never includes it.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    validate_role(&input.role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email.trim().to_lowercase(),
            password_hash,
            role: input.role,
            department_id: input.department_id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, created_by = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(
        &state.pool,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if let Some(role) = &input.role {
        validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/jobs/deadline-sweep
///
/// Run the deadline escalator immediately and return its summary.
pub async fn run_deadline_sweep(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<SweepSummary>>> {
    tracing::info!(user_id = admin.user_id, "Manual deadline sweep requested");
    let summary = run_sweep(&state.pool, &state.notifier, Utc::now()).await?;
    Ok(Json(DataResponse { data: summary }))
}
