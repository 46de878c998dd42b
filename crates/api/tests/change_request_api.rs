//! Change requests: submission, review, and reminders for stale approvals.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get_auth, insert_project, login_as, notifications_for, post_json_auth};
use pulse_api::background::deadline_risk::send_approval_reminders;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn submit(pool: &PgPool, token: &str, project_id: i64, body: Value) -> Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/change-requests"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn review(
    pool: &PgPool,
    token: &str,
    id: i64,
    action: &str,
    body: Value,
) -> axum::response::Response {
    post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/change-requests/{id}/{action}"),
        token,
        body,
    )
    .await
}

/// Pretend every notification was created `days` ago.
async fn age_notifications(pool: &PgPool, days: i32) {
    sqlx::query("UPDATE notifications SET created_at = NOW() - make_interval(days => $1)")
        .bind(days)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submission_asks_approvers(pool: PgPool) {
    let (manager_id, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (director_id, _) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, Some(manager_id)).await;

    let request = submit(
        &pool,
        &token,
        project_id,
        json!({ "reason": "Scope grew", "proposed_budget": 50000.0 }),
    )
    .await;
    assert_eq!(request["status"], "pending");
    assert_eq!(request["requested_by_user_id"], manager_id);

    let notes = notifications_for(&pool, director_id).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].requires_approval);
    assert_eq!(notes[0].related_entity.as_deref(), Some("ChangeRequest"));
    assert_eq!(notes[0].related_entity_id, request["id"].as_i64());
    assert!(notes[0].message.contains("Scope grew"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_without_a_proposal_is_rejected(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/change-requests"),
        &token,
        json!({ "reason": "Just because" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn workflow_status_cannot_be_proposed(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/change-requests"),
        &token,
        json!({ "reason": "Undo", "proposed_status": "pending" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn members_cannot_submit(pool: PgPool) {
    let (_, token) = login_as(&pool, "dev@pulse.test", "member").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/change-requests"),
        &token,
        json!({ "reason": "More time", "proposed_deadline": Utc::now() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_applies_the_change(pool: PgPool) {
    let (manager_id, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (director_id, director_token) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, Some(manager_id)).await;
    let deadline = Utc::now() + Duration::days(60);

    let request = submit(
        &pool,
        &manager_token,
        project_id,
        json!({
            "reason": "Vendor slipped",
            "proposed_status": "on_hold",
            "proposed_deadline": deadline,
        }),
    )
    .await;
    let request_id = request["id"].as_i64().unwrap();

    let response = review(&pool, &director_token, request_id, "approve", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "approved");
    assert_eq!(json["reviewed_by_user_id"], director_id);
    assert!(json["reviewed_at"].is_string());

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &manager_token,
    )
    .await;
    let project = body_json(response).await;
    assert_eq!(project["status"], "on_hold");
    assert!(project["deadline"].is_string());

    let notes = notifications_for(&pool, manager_id).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(
        notes[0].message,
        format!("Your change request #{request_id} was approved.")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejection_leaves_the_project_alone(pool: PgPool) {
    let (manager_id, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (_, director_token) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, Some(manager_id)).await;

    let request = submit(
        &pool,
        &manager_token,
        project_id,
        json!({ "reason": "Cancel it", "proposed_status": "cancelled" }),
    )
    .await;
    let request_id = request["id"].as_i64().unwrap();

    let response = review(
        &pool,
        &director_token,
        request_id,
        "reject",
        json!({ "comment": "Not yet" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["review_comment"], "Not yet");

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &manager_token,
    )
    .await;
    assert_eq!(body_json(response).await["status"], "in_progress");

    let notes = notifications_for(&pool, manager_id).await;
    assert_eq!(
        notes[0].message,
        format!("Your change request #{request_id} was rejected. Comment: Not yet")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_request_is_reviewed_only_once(pool: PgPool) {
    let (_, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (_, director_token) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;
    let request = submit(
        &pool,
        &manager_token,
        project_id,
        json!({ "reason": "Budget", "proposed_budget": 10.0 }),
    )
    .await;
    let request_id = request["id"].as_i64().unwrap();

    let first = review(&pool, &director_token, request_id, "reject", json!({})).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = review(&pool, &director_token, request_id, "approve", json!({})).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["error"], "Change request was already rejected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reviewing_missing_request_returns_404(pool: PgPool) {
    let (_, token) = login_as(&pool, "dir@pulse.test", "director").await;

    let response = review(&pool, &token, 31337, "approve", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn managers_cannot_review(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;
    let request = submit(
        &pool,
        &token,
        project_id,
        json!({ "reason": "Budget", "proposed_budget": 10.0 }),
    )
    .await;

    let request_id = request["id"].as_i64().unwrap();
    let response = review(&pool, &token, request_id, "approve", json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Approval reminders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_approval_requests_are_reminded_once(pool: PgPool) {
    let (_, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (director_id, _) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;
    submit(
        &pool,
        &manager_token,
        project_id,
        json!({ "reason": "Budget", "proposed_budget": 10.0 }),
    )
    .await;
    age_notifications(&pool, 3).await;

    let notifier = common::test_notifier(&pool);
    let sent = send_approval_reminders(&pool, &notifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(sent, 1);

    let notes = notifications_for(&pool, director_id).await;
    assert_eq!(notes.len(), 2);
    let reminder = notes
        .iter()
        .find(|n| n.message.starts_with("Reminder: "))
        .expect("a reminder should be stored");
    assert!(!reminder.requires_approval);
    assert_eq!(reminder.related_entity.as_deref(), Some("ChangeRequest"));

    let again = send_approval_reminders(&pool, &notifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fresh_or_settled_requests_are_not_reminded(pool: PgPool) {
    let (_, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (_, director_token) = login_as(&pool, "dir@pulse.test", "director").await;
    let project_id = insert_project(&pool, "Apollo", "in_progress", None, None).await;
    let request = submit(
        &pool,
        &manager_token,
        project_id,
        json!({ "reason": "Budget", "proposed_budget": 10.0 }),
    )
    .await;
    let notifier = common::test_notifier(&pool);

    let sent = send_approval_reminders(&pool, &notifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(sent, 0, "requests younger than two days wait");

    review(
        &pool,
        &director_token,
        request["id"].as_i64().unwrap(),
        "approve",
        json!({}),
    )
    .await;
    age_notifications(&pool, 3).await;

    let sent = send_approval_reminders(&pool, &notifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(sent, 0, "approved requests need no reminder");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_projects_are_reminded_too(pool: PgPool) {
    let (_, manager_token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let (admin_id, _) = login_as(&pool, "admin@pulse.test", "admin").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/projects",
        &manager_token,
        json!({ "title": "Apollo" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    age_notifications(&pool, 5).await;

    let notifier = common::test_notifier(&pool);
    let sent = send_approval_reminders(&pool, &notifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(sent, 1);

    let notes = notifications_for(&pool, admin_id).await;
    assert!(notes
        .iter()
        .any(|n| n.message == "Reminder: Project \"Apollo\" was submitted for approval."));
}
