use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness only; backend reachability is reported by `/debug`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Portal process is up", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
