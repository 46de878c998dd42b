//! Route definitions for the `/risk-issues` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::risk_issue;
use crate::state::AppState;

/// Routes mounted at `/risk-issues`.
///
/// ```text
/// PUT    /{id}   -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(risk_issue::update))
}
