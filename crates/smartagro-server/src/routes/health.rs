//! GET /health

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use smartagro_ai::ModelStatus;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub models: ModelStatus,
}

pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        models: state.registry.status(),
    })
}
