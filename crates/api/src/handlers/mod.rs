//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `pulse_db`, run the engines in
//! [`crate::engine`] where a mutation feeds derived data, and map errors via
//! [`AppError`].

pub mod admin;
pub mod auth;
pub mod change_request;
pub mod milestone;
pub mod notification;
pub mod project;
pub mod risk_issue;
pub mod task;
pub mod task_milestone;
pub mod weekly_update;

use pulse_core::error::CoreError;
use pulse_core::roles::APPROVER_ROLES;
use pulse_core::types::DbId;
use pulse_db::models::notification::NewNotification;
use pulse_db::models::project::Project;
use pulse_db::repositories::{ProjectRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Parse an optional vocabulary field, rejecting unknown values with 400.
pub(crate) fn parse_optional<T>(
    value: Option<&str>,
    parse: fn(&str) -> Result<T, String>,
) -> AppResult<Option<T>> {
    value
        .map(parse)
        .transpose()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

/// Load a project or fail with 404.
pub(crate) async fn find_project(state: &AppState, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))
}

/// Ask every active approver to act on an entity.
pub(crate) async fn request_approval(
    state: &AppState,
    message: &str,
    related_entity: &str,
    related_entity_id: DbId,
) -> AppResult<usize> {
    let approvers = UserRepo::list_active_by_roles(&state.pool, APPROVER_ROLES).await?;
    let approver_ids: Vec<DbId> = approvers.iter().map(|user| user.id).collect();
    let stored = state
        .notifier
        .notify_all(&approver_ids, |user_id| {
            NewNotification::about(user_id, message, related_entity, related_entity_id)
                .requiring_approval()
        })
        .await;
    tracing::info!(
        related_entity,
        related_entity_id,
        approvers = approver_ids.len(),
        stored,
        "Approval requested"
    );
    Ok(stored)
}
