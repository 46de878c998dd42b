//! Route definitions for the `/milestones` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::milestone;
use crate::state::AppState;

/// Routes mounted at `/milestones`.
///
/// ```text
/// GET    /{id}               -> get_by_id
/// PUT    /{id}               -> update
/// POST   /{id}/recalculate   -> recalculate
/// GET    /{id}/tasks         -> list_links
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(milestone::get_by_id).put(milestone::update))
        .route("/{id}/recalculate", post(milestone::recalculate))
        .route("/{id}/tasks", get(milestone::list_links))
}
