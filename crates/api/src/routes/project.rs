//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped collections under `/projects/{id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{change_request, milestone, project, risk_issue, task, weekly_update};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// POST   /{id}/approve              -> approve
/// POST   /{id}/reject               -> reject
///
/// GET    /{id}/tasks                -> task::list_by_project
/// POST   /{id}/tasks                -> task::create
/// GET    /{id}/milestones           -> milestone::list_by_project
/// POST   /{id}/milestones           -> milestone::create
/// GET    /{id}/risks                -> risk_issue::list_by_project
/// POST   /{id}/risks                -> risk_issue::create
/// GET    /{id}/weekly-updates       -> weekly_update::list_by_project
/// POST   /{id}/weekly-updates       -> weekly_update::create
/// GET    /{id}/change-requests      -> change_request::list_by_project
/// POST   /{id}/change-requests      -> change_request::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/approve", post(project::approve))
        .route("/{id}/reject", post(project::reject))
        .route(
            "/{id}/tasks",
            get(task::list_by_project).post(task::create),
        )
        .route(
            "/{id}/milestones",
            get(milestone::list_by_project).post(milestone::create),
        )
        .route(
            "/{id}/risks",
            get(risk_issue::list_by_project).post(risk_issue::create),
        )
        .route(
            "/{id}/weekly-updates",
            get(weekly_update::list_by_project).post(weekly_update::create),
        )
        .route(
            "/{id}/change-requests",
            get(change_request::list_by_project).post(change_request::create),
        )
}
