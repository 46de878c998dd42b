//! Handlers for tasks.
//!
//! A task update that changes the task's status recomputes every milestone
//! the task is linked to.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::status::{Priority, TaskStatus};
use pulse_core::types::DbId;
use pulse_db::models::task::{CreateTask, Task, UpdateTask};
use pulse_db::repositories::TaskRepo;
use validator::Validate;

use super::{find_project, parse_optional};
use crate::engine::milestone_progress::refresh_for_task;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    find_project(&state, project_id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/projects/{project_id}/tasks
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    input.validate()?;
    parse_optional(input.status.as_deref(), TaskStatus::from_str_value)?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;
    find_project(&state, project_id).await?;

    let task = TaskRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;
    Ok(Json(task))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    input.validate()?;
    parse_optional(input.status.as_deref(), TaskStatus::from_str_value)?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;

    let before = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;

    if task.status != before.status {
        tracing::debug!(task_id = id, from = %before.status, to = %task.status, "Task status changed");
        refresh_for_task(&state.pool, id).await;
    }
    Ok(Json(task))
}
