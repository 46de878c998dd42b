//! Route definitions for the `/change-requests` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::change_request;
use crate::state::AppState;

/// Routes mounted at `/change-requests`.
///
/// ```text
/// POST   /{id}/approve   -> approve
/// POST   /{id}/reject    -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/approve", post(change_request::approve))
        .route("/{id}/reject", post(change_request::reject))
}
