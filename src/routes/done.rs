use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::put,
};
use serde::Serialize;

use crate::{db::task_repo, error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct DoneResponse {
    pub id: i32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks/{task_id}/done", put(mark_done).delete(unmark_done))
        .with_state(state)
}

async fn mark_done(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<Json<DoneResponse>, AppError> {
    let marker = task_repo::mark_done(&state.db, task_id).await?;
    Ok(Json(DoneResponse { id: marker.id }))
}

async fn unmark_done(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    task_repo::unmark_done(&state.db, task_id).await?;
    Ok(StatusCode::OK)
}
