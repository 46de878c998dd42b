//! Milestone progress is recomputed whenever its inputs change.
//!
//! These tests drive the mutations over HTTP and check the derived
//! `completion_percentage` / `status` columns afterwards.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, delete_auth, get_auth, insert_project, insert_task, login_as, post_auth,
    post_json_auth, put_json_auth,
};
use pulse_api::engine::milestone_progress::{recalculate_for_task, recalculate_milestone};
use pulse_db::models::milestone::CreateMilestone;
use pulse_db::repositories::{MilestoneRepo, TaskMilestoneRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_milestone(pool: &PgPool, token: &str, project_id: i64, body: Value) -> Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/milestones"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn link(pool: &PgPool, token: &str, task_id: i64, milestone_id: i64, weight: f64) -> Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/milestones"),
        token,
        json!({ "milestone_id": milestone_id, "weight": weight }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn fetch_milestone(pool: &PgPool, token: &str, milestone_id: i64) -> Value {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/milestones/{milestone_id}"),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Link mutations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_milestone_starts_not_started(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;

    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M1" })).await;
    assert_eq!(milestone["completion_percentage"], 0);
    assert_eq!(milestone["status"], "not_started");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weighted_review_and_on_hold_gives_74(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let review = insert_task(&pool, project_id, "Review", "review", None, None).await;
    let held = insert_task(&pool, project_id, "Held", "on_hold", None, None).await;
    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M1" })).await;
    let milestone_id = milestone["id"].as_i64().unwrap();

    link(&pool, &token, review, milestone_id, 3.0).await;
    link(&pool, &token, held, milestone_id, 1.0).await;

    let milestone = fetch_milestone(&pool, &token, milestone_id).await;
    assert_eq!(milestone["completion_percentage"], 74);
    assert_eq!(milestone["status"], "in_progress");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reweighting_and_unlinking_recompute(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let done = insert_task(&pool, project_id, "Done", "completed", None, None).await;
    let todo = insert_task(&pool, project_id, "Todo", "todo", None, None).await;
    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M1" })).await;
    let milestone_id = milestone["id"].as_i64().unwrap();

    link(&pool, &token, done, milestone_id, 1.0).await;
    let todo_link = link(&pool, &token, todo, milestone_id, 1.0).await;
    assert_eq!(fetch_milestone(&pool, &token, milestone_id).await["completion_percentage"], 50);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/task-milestones/{}", todo_link["id"]),
        &token,
        json!({ "weight": 3.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fetch_milestone(&pool, &token, milestone_id).await["completion_percentage"], 25);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/task-milestones/{}", todo_link["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let milestone = fetch_milestone(&pool, &token, milestone_id).await;
    assert_eq!(milestone["completion_percentage"], 100);
    assert_eq!(milestone["status"], "completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removing_the_last_link_resets_to_zero(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "Done", "completed", None, None).await;
    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M1" })).await;
    let milestone_id = milestone["id"].as_i64().unwrap();
    let link_row = link(&pool, &token, task, milestone_id, 1.0).await;

    delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/task-milestones/{}", link_row["id"]),
        &token,
    )
    .await;

    let milestone = fetch_milestone(&pool, &token, milestone_id).await;
    assert_eq!(milestone["completion_percentage"], 0);
    assert_eq!(milestone["status"], "not_started");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cross_project_link_is_rejected(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let apollo = insert_project(&pool, "Apollo", "planning", None, None).await;
    let zephyr = insert_project(&pool, "Zephyr", "planning", None, None).await;
    let task = insert_task(&pool, apollo, "T", "todo", None, None).await;
    let milestone = create_milestone(&pool, &token, zephyr, json!({ "title": "M" })).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/tasks/{task}/milestones"),
        &token,
        json!({ "milestone_id": milestone["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_link_returns_409(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "todo", None, None).await;
    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M" })).await;
    let milestone_id = milestone["id"].as_i64().unwrap();
    link(&pool, &token, task, milestone_id, 1.0).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/tasks/{task}/milestones"),
        &token,
        json!({ "milestone_id": milestone_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Task and deadline changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_status_change_updates_every_linked_milestone(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "todo", None, None).await;
    let m1 = create_milestone(&pool, &token, project_id, json!({ "title": "M1" })).await;
    let m2 = create_milestone(&pool, &token, project_id, json!({ "title": "M2" })).await;
    let (m1, m2) = (m1["id"].as_i64().unwrap(), m2["id"].as_i64().unwrap());
    link(&pool, &token, task, m1, 1.0).await;
    link(&pool, &token, task, m2, 2.0).await;

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task}"),
        &token,
        json!({ "status": "in_progress" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    for milestone_id in [m1, m2] {
        let milestone = fetch_milestone(&pool, &token, milestone_id).await;
        assert_eq!(milestone["completion_percentage"], 50);
        assert_eq!(milestone["status"], "in_progress");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failing_milestone_does_not_block_the_others(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "todo", None, None).await;
    let broken = create_milestone(&pool, &token, project_id, json!({ "title": "Broken" })).await;
    let healthy = create_milestone(&pool, &token, project_id, json!({ "title": "Healthy" })).await;
    let (broken, healthy) = (broken["id"].as_i64().unwrap(), healthy["id"].as_i64().unwrap());
    link(&pool, &token, task, broken, 1.0).await;
    link(&pool, &token, task, healthy, 1.0).await;

    sqlx::query(&format!(
        "CREATE FUNCTION reject_milestone_update() RETURNS trigger AS $$
         BEGIN
             IF NEW.id = {broken} THEN
                 RAISE EXCEPTION 'milestone {broken} is locked';
             END IF;
             RETURN NEW;
         END;
         $$ LANGUAGE plpgsql"
    ))
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER trg_reject_milestone_update BEFORE UPDATE ON milestones
         FOR EACH ROW EXECUTE FUNCTION reject_milestone_update()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task}"),
        &token,
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let milestone = fetch_milestone(&pool, &token, healthy).await;
    assert_eq!(milestone["completion_percentage"], 100);
    assert_eq!(milestone["status"], "completed");
    let milestone = fetch_milestone(&pool, &token, broken).await;
    assert_eq!(milestone["completion_percentage"], 0);

    let outcome = recalculate_for_task(&pool, task, Utc::now()).await.unwrap();
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.updated.len(), 1);
    assert_eq!(outcome.updated[0].id, healthy);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn close_deadline_marks_behind_milestone_at_risk(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "in_progress", None, None).await;
    let milestone = create_milestone(&pool, &token, project_id, json!({ "title": "M" })).await;
    let milestone_id = milestone["id"].as_i64().unwrap();
    link(&pool, &token, task, milestone_id, 1.0).await;
    assert_eq!(fetch_milestone(&pool, &token, milestone_id).await["status"], "in_progress");

    let deadline = Utc::now() + Duration::days(2);
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/milestones/{milestone_id}"),
        &token,
        json!({ "deadline": deadline }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let milestone = body_json(response).await;
    assert_eq!(milestone["status"], "at_risk");
    assert_eq!(milestone["completion_percentage"], 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn past_deadline_marks_milestone_delayed(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;

    let deadline = Utc::now() - Duration::days(1);
    let milestone = create_milestone(
        &pool,
        &token,
        project_id,
        json!({ "title": "Late", "deadline": deadline }),
    )
    .await;
    assert_eq!(milestone["status"], "delayed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clearing_the_deadline_lifts_delayed_status(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let milestone = create_milestone(
        &pool,
        &token,
        project_id,
        json!({ "title": "Late", "deadline": Utc::now() - Duration::days(1) }),
    )
    .await;
    let milestone_id = milestone["id"].as_i64().unwrap();
    assert_eq!(milestone["status"], "delayed");

    // Omitting the key leaves the deadline alone.
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/milestones/{milestone_id}"),
        &token,
        json!({ "title": "Renamed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["deadline"].is_null());
    assert_eq!(json["status"], "delayed");

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/milestones/{milestone_id}"),
        &token,
        json!({ "deadline": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["deadline"].is_null());
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["status"], "not_started");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_cannot_set_derived_columns(pool: PgPool) {
    let (_, token) = login_as(&pool, "mgr@pulse.test", "manager").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;

    let milestone = create_milestone(
        &pool,
        &token,
        project_id,
        json!({ "title": "M", "completion_percentage": 90, "status": "completed" }),
    )
    .await;
    assert_eq!(milestone["completion_percentage"], 0);
    assert_eq!(milestone["status"], "not_started");
}

// ---------------------------------------------------------------------------
// Explicit recalculation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn recalculate_endpoint_returns_fresh_values(pool: PgPool) {
    let (_, token) = login_as(&pool, "mem@pulse.test", "member").await;
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "completed", None, None).await;
    let milestone = MilestoneRepo::create(
        &pool,
        project_id,
        &CreateMilestone {
            title: "M".to_string(),
            description: None,
            deadline: None,
        },
    )
    .await
    .unwrap();
    // Linked behind the API's back, so the stored values are stale.
    TaskMilestoneRepo::create(&pool, task, milestone.id, Some(1.0))
        .await
        .unwrap();

    let response = post_auth(
        common::build_test_app(pool),
        &format!("/api/v1/milestones/{}/recalculate", milestone.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["completion_percentage"], 100);
    assert_eq!(json["status"], "completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recalculate_missing_milestone_returns_404(pool: PgPool) {
    let (_, token) = login_as(&pool, "mem@pulse.test", "member").await;

    let response = post_auth(
        common::build_test_app(pool),
        "/api/v1/milestones/777/recalculate",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn engine_uses_the_given_clock(pool: PgPool) {
    let project_id = insert_project(&pool, "Apollo", "planning", None, None).await;
    let task = insert_task(&pool, project_id, "T", "review", None, None).await;
    let deadline = Utc::now() + Duration::days(10);
    let milestone = MilestoneRepo::create(
        &pool,
        project_id,
        &CreateMilestone {
            title: "M".to_string(),
            description: None,
            deadline: Some(deadline),
        },
    )
    .await
    .unwrap();
    TaskMilestoneRepo::create(&pool, task, milestone.id, None)
        .await
        .unwrap();

    let today = recalculate_milestone(&pool, milestone.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(today.completion_percentage, 90);
    assert_eq!(today.status, "in_progress");

    let later = recalculate_for_task(&pool, task, deadline + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(later.failed, 0);
    assert_eq!(later.updated.len(), 1);
    assert_eq!(later.updated[0].status, "delayed");

    assert!(recalculate_milestone(&pool, 9999, Utc::now())
        .await
        .unwrap()
        .is_none());
}
