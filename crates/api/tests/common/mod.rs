//! Shared helpers for the API integration tests.
//!
//! Each test file compiles this module separately, so not every helper is
//! used everywhere.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use pulse_api::auth::jwt::{generate_access_token, JwtConfig};
use pulse_api::auth::password::hash_password;
use pulse_api::config::{JobsConfig, ServerConfig};
use pulse_api::notifications::Notifier;
use pulse_api::router::build_app_router;
use pulse_api::state::AppState;
use pulse_db::models::notification::Notification;
use pulse_db::models::project::CreateProject;
use pulse_db::models::task::CreateTask;
use pulse_db::models::user::CreateUser;
use pulse_db::repositories::{NotificationRepo, ProjectRepo, TaskRepo, UserRepo};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "pulse-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        jobs: JobsConfig::default(),
    }
}

/// A notifier that stores notifications without sending email.
pub fn test_notifier(pool: &PgPool) -> Notifier {
    Notifier::new(pool.clone(), None)
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        notifier: Arc::new(test_notifier(&pool)),
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user with [`TEST_PASSWORD`] and return their id.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
            department_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// A bearer token for the given user, signed with the test secret.
pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

/// Insert a user and return `(id, token)`.
pub async fn login_as(pool: &PgPool, email: &str, role: &str) -> (i64, String) {
    let id = create_user(pool, email, role).await;
    (id, token_for(id, role))
}

/// Insert a project directly with the given status.
pub async fn insert_project(
    pool: &PgPool,
    title: &str,
    status: &str,
    deadline: Option<DateTime<Utc>>,
    manager_user_id: Option<i64>,
) -> i64 {
    ProjectRepo::create(
        pool,
        &CreateProject {
            title: title.to_string(),
            description: None,
            status: None,
            priority: None,
            budget: None,
            start_date: None,
            deadline,
            department_id: None,
            manager_user_id,
        },
        status,
    )
    .await
    .unwrap()
    .id
}

/// Insert a task directly.
pub async fn insert_task(
    pool: &PgPool,
    project_id: i64,
    title: &str,
    status: &str,
    deadline: Option<DateTime<Utc>>,
    assigned_user_id: Option<i64>,
) -> i64 {
    TaskRepo::create(
        pool,
        project_id,
        &CreateTask {
            title: title.to_string(),
            description: None,
            status: Some(status.to_string()),
            priority: None,
            deadline,
            assigned_user_id,
        },
    )
    .await
    .unwrap()
    .id
}

/// All notifications for a user, newest first.
pub async fn notifications_for(pool: &PgPool, user_id: i64) -> Vec<Notification> {
    NotificationRepo::list_for_user(pool, user_id, false, 200, 0)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(request(Method::GET, uri, None, None))
        .await
        .unwrap()
}

/// Unauthenticated POST with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(request(Method::POST, uri, None, Some(body)))
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    app.oneshot(request(Method::GET, uri, Some(token), None))
        .await
        .unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(request(Method::POST, uri, Some(token), Some(body)))
        .await
        .unwrap()
}

/// POST without a body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    app.oneshot(request(Method::POST, uri, Some(token), None))
        .await
        .unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(request(Method::PUT, uri, Some(token), Some(body)))
        .await
        .unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    app.oneshot(request(Method::DELETE, uri, Some(token), None))
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
