use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::Local;
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use serde_json::json;
use tower::ServiceExt;

use task_server::{db, routes::router, state::AppState};

// A single pooled connection keeps every query on the same in-memory database.
async fn app_state() -> std::sync::Arc<AppState> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let conn = Database::connect(opt).await.expect("connect to database");
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .expect("enable foreign keys");
    db::setup_schema(&conn).await.expect("create schema");
    AppState::new(conn)
}

async fn send(
    state: &std::sync::Arc<AppState>,
    request: Request<Body>,
) -> axum::response::Response {
    router(state.clone()).oneshot(request).await.unwrap()
}

async fn json_response(
    state: &std::sync::Arc<AppState>,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = send(state, request).await;
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn put_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put(uri: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn create_and_read() {
    let state = app_state().await;

    let (status, task) =
        json_response(&state, post_json("/tasks", json!({ "title": "テストタスク" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"].as_str(), Some("テストタスク"));
    assert_eq!(task["done"].as_bool(), Some(false));
    assert!(task["due_date"].is_null());

    let (status, tasks) = json_response(&state, get("/tasks")).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"].as_str(), Some("テストタスク"));
    assert_eq!(tasks[0]["done"].as_bool(), Some(false));
}

#[tokio::test]
async fn done_flag_transitions() {
    let state = app_state().await;

    let (status, _) =
        json_response(&state, post_json("/tasks", json!({ "title": "テストタスク2" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, marker) = json_response(&state, put("/tasks/1/done")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marker["id"].as_i64(), Some(1));

    // second mark is a conflict, surfaced as 400
    let response = send(&state, put("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&state, delete("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, delete("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calc_pow_squares_input() {
    let state = app_state().await;

    let (status, result) = json_response(&state, post_json("/calc_pow", json!({ "input": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["ans"].as_f64(), Some(9.0));
}

#[tokio::test]
async fn create_task_with_deadline() {
    let state = app_state().await;

    let (status, task) = json_response(
        &state,
        post_json(
            "/tasks",
            json!({ "title": "締切付きタスク", "due_date": "2025-04-15" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"].as_str(), Some("締切付きタスク"));
    assert!(task["due_date"].as_str().unwrap().starts_with("2025-04-15"));
}

#[tokio::test]
async fn update_task_deadline() {
    let state = app_state().await;

    let (status, task) = json_response(
        &state,
        post_json(
            "/tasks",
            json!({ "title": "締切を更新するタスク", "due_date": "2025-04-10" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let task_id = task["id"].as_i64().unwrap();

    let (status, updated) = json_response(
        &state,
        put_json(
            &format!("/tasks/{task_id}"),
            json!({ "title": "締切を更新するタスク", "due_date": "2025-04-20" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["due_date"].as_str().unwrap().starts_with("2025-04-20"));
}

#[tokio::test]
async fn update_preserves_done_state() {
    let state = app_state().await;

    let (status, _) = json_response(&state, post_json("/tasks", json!({ "title": "before" }))).await;
    assert_eq!(status, StatusCode::OK);

    let response = send(&state, put("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, updated) =
        json_response(&state, put_json("/tasks/1", json!({ "title": "after" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"].as_str(), Some("after"));
    assert_eq!(updated["done"].as_bool(), Some(true));

    let (status, fetched) = json_response(&state, get("/tasks/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["done"].as_bool(), Some(true));
}

#[tokio::test]
async fn delete_cascades_done_marker() {
    let state = app_state().await;

    let (status, _) = json_response(&state, post_json("/tasks", json!({ "title": "doomed" }))).await;
    assert_eq!(status, StatusCode::OK);

    let response = send(&state, put("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, delete("/tasks/1")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, get("/tasks/1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // the marker went with the task: re-marking reports the missing task,
    // not a conflict with a leftover marker
    let response = send(&state, put("/tasks/1/done")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, tasks) = json_response(&state, get("/tasks")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let state = app_state().await;

    let response = send(&state, get("/tasks/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &state,
        put_json("/tasks/999", json!({ "title": "nobody home" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&state, delete("/tasks/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn due_today_day_boundary() {
    let state = app_state().await;

    let today = Local::now().date_naive();
    let tomorrow = today.succ_opt().unwrap();
    let last_second = today.and_hms_opt(23, 59, 59).unwrap();
    let next_midnight = tomorrow.and_hms_opt(0, 0, 0).unwrap();

    let (status, included) = json_response(
        &state,
        post_json(
            "/tasks",
            json!({
                "title": "due tonight",
                "due_date": last_second.format("%Y-%m-%dT%H:%M:%S").to_string(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let included_id = included["id"].as_i64().unwrap();

    let (status, _) = json_response(
        &state,
        post_json(
            "/tasks",
            json!({
                "title": "due tomorrow",
                "due_date": next_midnight.format("%Y-%m-%dT%H:%M:%S").to_string(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_response(&state, post_json("/tasks", json!({ "title": "undated" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, due) = json_response(&state, get("/tasks/due_today")).await;
    assert_eq!(status, StatusCode::OK);
    let due = due.as_array().unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0]["id"].as_i64(), Some(included_id));
    assert_eq!(due[0]["done"].as_bool(), Some(false));
    assert!(due[0]["due_date"].as_str().unwrap().starts_with(&today.to_string()));
}
