//! Handlers for the `/projects` resource, including the approval workflow.
//!
//! Projects created by a `manager` start as `pending` and must be approved
//! by a director or above before work starts. Higher roles create projects
//! directly in `planning` (or the status they ask for).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::error::CoreError;
use pulse_core::roles::ROLE_MANAGER;
use pulse_core::status::{Priority, ProjectStatus};
use pulse_core::types::DbId;
use pulse_db::models::notification::NewNotification;
use pulse_db::models::project::{CreateProject, Project, UpdateProject};
use pulse_db::repositories::ProjectRepo;
use pulse_db::{clamp_limit, clamp_offset};
use validator::Validate;

use super::{find_project, parse_optional, request_approval};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDirector, RequireManager};
use crate::query::ProjectListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Statuses only the approval workflow may assign.
fn reject_workflow_status(status: Option<ProjectStatus>) -> AppResult<()> {
    match status {
        Some(ProjectStatus::Pending | ProjectStatus::Rejected) => Err(AppError::Core(
            CoreError::Validation("Status pending/rejected is set by the approval workflow".into()),
        )),
        _ => Ok(()),
    }
}

/// POST /api/v1/projects
///
/// Managers submit projects for approval: the project is stored as
/// `pending`, defaults its manager to the caller and every approver is
/// notified. Other roles create the project directly.
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    input.validate()?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;
    let requested = parse_optional(input.status.as_deref(), ProjectStatus::from_str_value)?;
    reject_workflow_status(requested)?;

    let needs_approval = user.role == ROLE_MANAGER;
    let (status, input) = if needs_approval {
        let manager_user_id = input.manager_user_id.or(Some(user.user_id));
        (
            ProjectStatus::Pending,
            CreateProject {
                manager_user_id,
                ..input
            },
        )
    } else {
        (requested.unwrap_or(ProjectStatus::Planning), input)
    };

    let project = ProjectRepo::create(&state.pool, &input, status.as_str()).await?;
    tracing::info!(
        project_id = project.id,
        status = %project.status,
        created_by = user.user_id,
        "Project created"
    );

    if needs_approval {
        let message = format!(
            "Project \"{}\" was submitted for approval.",
            project.title
        );
        request_approval(&state, &message, "Project", project.id).await?;
    }

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    parse_optional(params.status.as_deref(), ProjectStatus::from_str_value)?;
    let projects = ProjectRepo::list(
        &state.pool,
        params.status.as_deref(),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    Ok(Json(find_project(&state, id).await?))
}

/// PUT /api/v1/projects/{id}
///
/// A pending project's status can only change through approve/reject.
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    input.validate()?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;
    let status = parse_optional(input.status.as_deref(), ProjectStatus::from_str_value)?;
    reject_workflow_status(status)?;

    let current = find_project(&state, id).await?;
    if status.is_some() && current.status == ProjectStatus::Pending.as_str() {
        return Err(AppError::Core(CoreError::Conflict(
            "Project is awaiting approval".into(),
        )));
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireDirector(reviewer): RequireDirector,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = review(&state, id, ProjectStatus::Planning).await?;
    tracing::info!(project_id = id, reviewer = reviewer.user_id, "Project approved");
    notify_manager(
        &state,
        &project,
        format!("Your project \"{}\" was approved.", project.title),
    )
    .await;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireDirector(reviewer): RequireDirector,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = review(&state, id, ProjectStatus::Rejected).await?;
    tracing::info!(project_id = id, reviewer = reviewer.user_id, "Project rejected");
    notify_manager(
        &state,
        &project,
        format!("Your project \"{}\" was rejected.", project.title),
    )
    .await;
    Ok(Json(project))
}

/// Move a pending project to `to`. 404 if missing, 409 if no longer pending.
async fn review(state: &AppState, id: DbId, to: ProjectStatus) -> AppResult<Project> {
    let transitioned = ProjectRepo::transition_status(
        &state.pool,
        id,
        ProjectStatus::Pending.as_str(),
        to.as_str(),
    )
    .await?;

    match transitioned {
        Some(project) => Ok(project),
        None => {
            let current = find_project(state, id).await?;
            Err(AppError::Core(CoreError::Conflict(format!(
                "Project is {}, not pending",
                current.status
            ))))
        }
    }
}

async fn notify_manager(state: &AppState, project: &Project, message: String) {
    if let Some(manager) = project.manager_user_id {
        state
            .notifier
            .notify(NewNotification::about(manager, message, "Project", project.id))
            .await;
    }
}
