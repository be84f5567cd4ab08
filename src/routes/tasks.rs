use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    db::{
        entities::{done, task, task::TaskStatus},
        task_repo,
    },
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct TaskListEntry {
    pub id: i32,
    pub title: Option<String>,
    pub done: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/due_today", get(list_due_today))
        .route(
            "/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(state)
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TaskPayload>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = task_repo::create_task(&state.db, body.title, body.due_date).await?;
    Ok(Json(TaskResponse::new(task, TaskStatus::Pending)))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskListEntry>>, AppError> {
    let tasks = task_repo::list_tasks(&state.db).await?;
    Ok(Json(tasks.into_iter().map(TaskListEntry::from).collect()))
}

async fn list_due_today(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let tasks = task_repo::list_due_today(&state.db).await?;
    Ok(Json(
        tasks
            .into_iter()
            .map(|(task, marker)| {
                let status = TaskStatus::from_marker(marker.as_ref());
                TaskResponse::new(task, status)
            })
            .collect(),
    ))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<Json<TaskResponse>, AppError> {
    let (task, status) = task_repo::get_task(&state.db, task_id).await?;
    Ok(Json(TaskResponse::new(task, status)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
    Json(body): Json<TaskPayload>,
) -> Result<Json<TaskResponse>, AppError> {
    let (task, status) =
        task_repo::update_task(&state.db, task_id, body.title, body.due_date).await?;
    Ok(Json(TaskResponse::new(task, status)))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    task_repo::delete_task(&state.db, task_id).await?;
    Ok(StatusCode::OK)
}

impl TaskResponse {
    fn new(task: task::Model, status: TaskStatus) -> Self {
        Self {
            id: task.id,
            title: task.title,
            due_date: task.due_date,
            done: status.is_complete(),
        }
    }
}

impl From<(task::Model, Option<done::Model>)> for TaskListEntry {
    fn from((task, marker): (task::Model, Option<done::Model>)) -> Self {
        Self {
            id: task.id,
            title: task.title,
            done: TaskStatus::from_marker(marker.as_ref()).is_complete(),
        }
    }
}

/// Accepts an ISO-8601 date (midnight implied), a naive datetime, or an
/// RFC 3339 datetime with offset.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match parse_due_date(&raw) {
        Some(due_date) => Ok(Some(due_date)),
        None => Err(serde::de::Error::custom(format!(
            "invalid due_date: {raw}"
        ))),
    }
}

fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = raw.parse::<NaiveDateTime>() {
        return Some(datetime);
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date.and_time(NaiveTime::MIN));
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.naive_local())
}
