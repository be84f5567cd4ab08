use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod calc;
pub mod done;
pub mod tasks;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(tasks::router(state.clone()))
        .merge(done::router(state))
        .merge(calc::router())
}
