use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CalcInput {
    pub input: f64,
}

#[derive(Debug, Serialize)]
pub struct CalcOutput {
    pub ans: f64,
}

pub fn router() -> Router {
    Router::new().route("/calc_pow", post(calc_pow))
}

async fn calc_pow(Json(body): Json<CalcInput>) -> Json<CalcOutput> {
    Json(CalcOutput {
        ans: body.input * body.input,
    })
}
