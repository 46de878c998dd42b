//! Handlers for milestones.
//!
//! Completion percentage and status are derived, never written by clients.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pulse_core::types::DbId;
use pulse_db::models::milestone::{CreateMilestone, Milestone, TaskMilestone, UpdateMilestone};
use pulse_db::repositories::{MilestoneRepo, TaskMilestoneRepo};
use validator::Validate;

use super::find_project;
use crate::engine::milestone_progress::{recalculate_milestone, refresh_milestone};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_milestone(state: &AppState, id: DbId) -> AppResult<Milestone> {
    MilestoneRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))
}

/// GET /api/v1/projects/{project_id}/milestones
pub async fn list_by_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Milestone>>>> {
    find_project(&state, project_id).await?;
    let milestones = MilestoneRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: milestones }))
}

/// POST /api/v1/projects/{project_id}/milestones
///
/// The new milestone is evaluated once so a close deadline is reflected
/// in its status immediately.
pub async fn create(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateMilestone>,
) -> AppResult<(StatusCode, Json<Milestone>)> {
    input.validate()?;
    find_project(&state, project_id).await?;

    let milestone = MilestoneRepo::create(&state.pool, project_id, &input).await?;
    refresh_milestone(&state.pool, milestone.id).await;
    let milestone = find_milestone(&state, milestone.id).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// GET /api/v1/milestones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Milestone>> {
    Ok(Json(find_milestone(&state, id).await?))
}

/// PUT /api/v1/milestones/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMilestone>,
) -> AppResult<Json<Milestone>> {
    input.validate()?;
    let before = find_milestone(&state, id).await?;
    let milestone = MilestoneRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))?;

    if milestone.deadline != before.deadline {
        refresh_milestone(&state.pool, id).await;
        return Ok(Json(find_milestone(&state, id).await?));
    }
    Ok(Json(milestone))
}

/// POST /api/v1/milestones/{id}/recalculate
///
/// Recompute on demand. Unlike the automatic triggers, failures surface
/// to the caller.
pub async fn recalculate(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Milestone>> {
    let milestone = recalculate_milestone(&state.pool, id, Utc::now())
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))?;
    Ok(Json(milestone))
}

/// GET /api/v1/milestones/{id}/tasks
pub async fn list_links(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TaskMilestone>>>> {
    find_milestone(&state, id).await?;
    let links = TaskMilestoneRepo::list_by_milestone(&state.pool, id).await?;
    Ok(Json(DataResponse { data: links }))
}
