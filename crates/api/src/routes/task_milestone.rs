//! Route definitions for the `/task-milestones` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::task_milestone;
use crate::state::AppState;

/// Routes mounted at `/task-milestones`.
///
/// ```text
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(task_milestone::update).delete(task_milestone::delete),
    )
}
