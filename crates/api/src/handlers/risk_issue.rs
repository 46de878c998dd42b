//! Handlers for risks and issues.
//!
//! Deadline records are raised by the escalator; these endpoints let people
//! record their own and move any record through its lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_core::status::{Priority, RiskIssueStatus, RiskIssueType};
use pulse_core::types::DbId;
use pulse_db::models::risk_issue::{CreateRiskIssue, RiskIssue, UpdateRiskIssue};
use pulse_db::repositories::RiskIssueRepo;
use validator::Validate;

use super::{find_project, parse_optional};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::RiskListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/risks?type=
pub async fn list_by_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<RiskListParams>,
) -> AppResult<Json<DataResponse<Vec<RiskIssue>>>> {
    parse_optional(params.record_type.as_deref(), RiskIssueType::from_str_value)?;
    find_project(&state, project_id).await?;
    let records =
        RiskIssueRepo::list_by_project(&state.pool, project_id, params.record_type.as_deref())
            .await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/projects/{project_id}/risks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateRiskIssue>,
) -> AppResult<(StatusCode, Json<RiskIssue>)> {
    input.validate()?;
    parse_optional(input.record_type.as_deref(), RiskIssueType::from_str_value)?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;
    find_project(&state, project_id).await?;

    let record = RiskIssueRepo::create(&state.pool, project_id, Some(user.user_id), &input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/risk-issues/{id}
///
/// Resolving or closing a deadline record releases its item, so a later
/// sweep may raise a fresh one.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRiskIssue>,
) -> AppResult<Json<RiskIssue>> {
    input.validate()?;
    parse_optional(input.record_type.as_deref(), RiskIssueType::from_str_value)?;
    parse_optional(input.priority.as_deref(), Priority::from_str_value)?;
    parse_optional(input.status.as_deref(), RiskIssueStatus::from_str_value)?;

    let record = RiskIssueRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("RiskIssue", id))?;
    Ok(Json(record))
}
