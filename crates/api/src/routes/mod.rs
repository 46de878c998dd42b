pub mod admin;
pub mod auth;
pub mod change_request;
pub mod health;
pub mod milestone;
pub mod notification;
pub mod project;
pub mod risk_issue;
pub mod task;
pub mod task_milestone;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /admin/departments                               list, create (admin only)
/// /admin/departments/{id}                          get, update
/// /admin/users                                     list, create
/// /admin/users/{id}                                get, update
/// /admin/jobs/deadline-sweep                       run escalator now (POST)
///
/// /projects                                        list, create (manager+)
/// /projects/{id}                                   get, update
/// /projects/{id}/approve                           approve (director+)
/// /projects/{id}/reject                            reject (director+)
/// /projects/{id}/tasks                             list, create
/// /projects/{id}/milestones                        list, create
/// /projects/{id}/risks                             list (?type=), create
/// /projects/{id}/weekly-updates                    list, submit
/// /projects/{id}/change-requests                   list, create (manager+)
///
/// /tasks/{id}                                      get, update
/// /tasks/{id}/milestones                           list links, link
///
/// /milestones/{id}                                 get, update
/// /milestones/{id}/recalculate                     recompute (POST)
/// /milestones/{id}/tasks                           list links
///
/// /task-milestones/{id}                            update weight, unlink
///
/// /risk-issues/{id}                                update
///
/// /change-requests/{id}/approve                    approve (director+)
/// /change-requests/{id}/reject                     reject (director+)
///
/// /notifications                                   list (?unread_only=)
/// /notifications/unread-count                      count
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}/read                         mark one read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/milestones", milestone::router())
        .nest("/task-milestones", task_milestone::router())
        .nest("/risk-issues", risk_issue::router())
        .nest("/change-requests", change_request::router())
        .nest("/notifications", notification::router())
}
