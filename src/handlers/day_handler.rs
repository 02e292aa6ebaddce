use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{DayStatus, DayStatusView},
    AppResult, AppState,
};

/// GET /employee/day/status
#[utoipa::path(
    get,
    path = "/employee/day/status",
    responses(
        (status = 200, description = "Today's day status with the allowed controls", body = DayStatusView)
    ),
    tag = "day",
    security(("cookie_auth" = []))
)]
pub async fn get_day_status(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<DayStatusView>> {
    let status: DayStatus = auth
        .api(&state)
        .send(BackendRequest::get("/employee/day/status"))
        .await?;
    Ok(Json(status.into()))
}

/// POST /employee/day/start
///
/// Sequencing (no double start, no start after end) is the backend's call;
/// its message is passed through.
#[utoipa::path(
    post,
    path = "/employee/day/start",
    responses(
        (status = 200, description = "Day started", body = DayStatusView),
        (status = 400, description = "Day already started or ended")
    ),
    tag = "day",
    security(("cookie_auth" = []))
)]
pub async fn start_day(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<DayStatusView>> {
    let status: DayStatus = auth
        .api(&state)
        .send(BackendRequest::post("/employee/day/start"))
        .await?;
    tracing::info!(user_id = auth.user_id(), "Day started");
    Ok(Json(status.into()))
}

/// POST /employee/day/end
#[utoipa::path(
    post,
    path = "/employee/day/end",
    responses(
        (status = 200, description = "Day ended", body = DayStatusView),
        (status = 400, description = "Day not started or already ended")
    ),
    tag = "day",
    security(("cookie_auth" = []))
)]
pub async fn end_day(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<DayStatusView>> {
    let status: DayStatus = auth
        .api(&state)
        .send(BackendRequest::post("/employee/day/end"))
        .await?;
    tracing::info!(user_id = auth.user_id(), "Day ended");
    Ok(Json(status.into()))
}
