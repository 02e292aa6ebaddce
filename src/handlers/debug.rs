use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::AppState;

#[derive(Serialize)]
pub struct DebugInfo {
    pub version: String,
    pub git_sha: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub backend_url: String,
    pub backend_status: String,
    pub active_sessions: u64,
    pub in_flight_submissions: usize,
    pub timestamp: u64,
}

/// Global start time for uptime calculation
static START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Pin the uptime origin to process start rather than the first /debug call.
pub fn mark_start() {
    once_cell::sync::Lazy::force(&START_TIME);
}

/// Handler for the /debug endpoint
pub async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<DebugInfo> {
    // Any HTTP answer means the backend is reachable; auth is not needed for that
    let backend_status = match state
        .backend
        .dispatch(&crate::backend::BackendRequest::get("/"), None)
        .await
    {
        Ok(response) => format!("reachable ({})", response.status().as_u16()),
        Err(e) => format!("error: {}", e),
    };

    let info = DebugInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_sha: option_env!("GIT_SHA").unwrap_or("unknown").to_string(),
        environment: std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string()),
        uptime_seconds: START_TIME.elapsed().unwrap_or_default().as_secs(),
        backend_url: state.config.api_base_url.clone(),
        backend_status,
        active_sessions: state.sessions.active_count().await,
        in_flight_submissions: state.submissions.in_flight(),
        timestamp: SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    };

    Json(info)
}
