//! Handlers for project change requests.
//!
//! A manager proposes a new status, deadline and/or budget with a reason.
//! Approvers are asked to review it; approving applies the proposal to the
//! project, rejecting only records the decision. Either way the request is
//! reviewed once.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::error::CoreError;
use pulse_core::status::{ChangeRequestStatus, ProjectStatus};
use pulse_core::types::DbId;
use pulse_db::models::change_request::{ChangeRequest, CreateChangeRequest, ReviewChangeRequest};
use pulse_db::models::notification::NewNotification;
use pulse_db::repositories::{ChangeRequestRepo, ProjectRepo};
use validator::Validate;

use super::{find_project, parse_optional, request_approval};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDirector, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

const RELATED_ENTITY: &str = "ChangeRequest";

/// GET /api/v1/projects/{project_id}/change-requests
pub async fn list_by_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ChangeRequest>>>> {
    find_project(&state, project_id).await?;
    let requests = ChangeRequestRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/projects/{project_id}/change-requests
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateChangeRequest>,
) -> AppResult<(StatusCode, Json<ChangeRequest>)> {
    input.validate()?;
    if !input.has_proposal() {
        return Err(AppError::Core(CoreError::Validation(
            "A change request must propose a status, deadline or budget".into(),
        )));
    }
    let proposed = parse_optional(input.proposed_status.as_deref(), ProjectStatus::from_str_value)?;
    if matches!(
        proposed,
        Some(ProjectStatus::Pending | ProjectStatus::Rejected)
    ) {
        return Err(AppError::Core(CoreError::Validation(
            "Status pending/rejected is set by the approval workflow".into(),
        )));
    }

    let project = find_project(&state, project_id).await?;
    let request =
        ChangeRequestRepo::create(&state.pool, project_id, Some(user.user_id), &input).await?;
    tracing::info!(
        change_request_id = request.id,
        project_id,
        requested_by = user.user_id,
        "Change request submitted"
    );

    let message = format!(
        "A change to project \"{}\" was requested: {}",
        project.title, request.reason
    );
    request_approval(&state, &message, RELATED_ENTITY, request.id).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/v1/change-requests/{id}/approve
///
/// Claims the request first so two reviewers cannot both apply it.
pub async fn approve(
    State(state): State<AppState>,
    RequireDirector(reviewer): RequireDirector,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewChangeRequest>,
) -> AppResult<Json<ChangeRequest>> {
    let request = claim(&state, id, ChangeRequestStatus::Approved, reviewer.user_id, &input).await?;

    ProjectRepo::apply_change(
        &state.pool,
        request.project_id,
        request.proposed_status.as_deref(),
        request.proposed_deadline,
        request.proposed_budget,
    )
    .await?
    .ok_or_else(|| AppError::not_found("Project", request.project_id))?;

    tracing::info!(
        change_request_id = id,
        project_id = request.project_id,
        reviewer = reviewer.user_id,
        "Change request approved and applied"
    );
    notify_requester(&state, &request, "approved").await;
    Ok(Json(request))
}

/// POST /api/v1/change-requests/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireDirector(reviewer): RequireDirector,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewChangeRequest>,
) -> AppResult<Json<ChangeRequest>> {
    let request = claim(&state, id, ChangeRequestStatus::Rejected, reviewer.user_id, &input).await?;
    tracing::info!(change_request_id = id, reviewer = reviewer.user_id, "Change request rejected");
    notify_requester(&state, &request, "rejected").await;
    Ok(Json(request))
}

/// Record the decision on a pending request. 404 if missing, 409 if reviewed.
async fn claim(
    state: &AppState,
    id: DbId,
    decision: ChangeRequestStatus,
    reviewer_id: DbId,
    input: &ReviewChangeRequest,
) -> AppResult<ChangeRequest> {
    let reviewed = ChangeRequestRepo::mark_reviewed(
        &state.pool,
        id,
        decision.as_str(),
        reviewer_id,
        input.comment.as_deref(),
    )
    .await?;

    match reviewed {
        Some(request) => Ok(request),
        None => {
            let current = ChangeRequestRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::not_found("ChangeRequest", id))?;
            Err(AppError::Core(CoreError::Conflict(format!(
                "Change request was already {}",
                current.status
            ))))
        }
    }
}

async fn notify_requester(state: &AppState, request: &ChangeRequest, outcome: &str) {
    let Some(requester) = request.requested_by_user_id else {
        return;
    };
    let mut message = format!("Your change request #{} was {outcome}.", request.id);
    if let Some(comment) = &request.review_comment {
        message.push_str(&format!(" Comment: {comment}"));
    }
    state
        .notifier
        .notify(NewNotification::about(
            requester,
            message,
            RELATED_ENTITY,
            request.id,
        ))
        .await;
}
