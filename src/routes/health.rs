use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{AppState, timezone::TimezoneManager, utils::success_to_api_response};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: &'static str,
    pub firebase_configured: bool,
    pub time: String,
}

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    success_to_api_response(HealthResponse {
        status: "ok",
        environment: state.config.environment.as_str(),
        firebase_configured: state.firebase.is_some(),
        time: TimezoneManager::utc_now_iso(),
    })
}
