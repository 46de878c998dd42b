//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /departments             -> list_departments
/// POST   /departments             -> create_department
/// GET    /departments/{id}        -> get_department
/// PUT    /departments/{id}        -> update_department
/// GET    /users                   -> list_users
/// POST   /users                   -> create_user
/// GET    /users/{id}              -> get_user
/// PUT    /users/{id}              -> update_user
/// POST   /jobs/deadline-sweep     -> run_deadline_sweep
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/departments",
            get(admin::list_departments).post(admin::create_department),
        )
        .route(
            "/departments/{id}",
            get(admin::get_department).put(admin::update_department),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", get(admin::get_user).put(admin::update_user))
        .route("/jobs/deadline-sweep", post(admin::run_deadline_sweep))
}
