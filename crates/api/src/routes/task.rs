//! Route definitions for the `/tasks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{task, task_milestone};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// GET    /{id}/milestones       -> task_milestone::list_by_task
/// POST   /{id}/milestones       -> task_milestone::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(task::get_by_id).put(task::update))
        .route(
            "/{id}/milestones",
            get(task_milestone::list_by_task).post(task_milestone::create),
        )
}
