//! Handlers for task-milestone links.
//!
//! Every successful link mutation recomputes the affected milestone.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::types::DbId;
use pulse_db::models::milestone::{CreateTaskMilestone, TaskMilestone, UpdateTaskMilestone};
use pulse_db::repositories::{MilestoneRepo, TaskMilestoneRepo, TaskRepo};
use validator::Validate;

use crate::engine::milestone_progress::refresh_milestone;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tasks/{task_id}/milestones
pub async fn list_by_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TaskMilestone>>>> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))?;
    let links = TaskMilestoneRepo::list_by_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/tasks/{task_id}/milestones
///
/// The task and milestone must belong to the same project.
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateTaskMilestone>,
) -> AppResult<(StatusCode, Json<TaskMilestone>)> {
    input.validate()?;
    let task = TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))?;
    let milestone = MilestoneRepo::find_by_id(&state.pool, input.milestone_id)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", input.milestone_id))?;
    if task.project_id != milestone.project_id {
        return Err(AppError::BadRequest(
            "Task and milestone belong to different projects".into(),
        ));
    }

    let link = TaskMilestoneRepo::create(&state.pool, task_id, milestone.id, input.weight).await?;
    refresh_milestone(&state.pool, link.milestone_id).await;
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/v1/task-milestones/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskMilestone>,
) -> AppResult<Json<TaskMilestone>> {
    input.validate()?;
    let link = TaskMilestoneRepo::update_weight(&state.pool, id, input.weight)
        .await?
        .ok_or_else(|| AppError::not_found("TaskMilestone", id))?;
    refresh_milestone(&state.pool, link.milestone_id).await;
    Ok(Json(link))
}

/// DELETE /api/v1/task-milestones/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let link = TaskMilestoneRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("TaskMilestone", id))?;
    refresh_milestone(&state.pool, link.milestone_id).await;
    Ok(StatusCode::NO_CONTENT)
}
