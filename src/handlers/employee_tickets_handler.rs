use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    handlers::tickets_handler::StatusParam,
    models::SubTicket,
    AppError, AppResult, AppState,
};

/// GET /employee/tickets
#[utoipa::path(
    get,
    path = "/employee/tickets",
    responses(
        (status = 200, description = "Assignments for the current employee", body = Vec<SubTicket>)
    ),
    tag = "employee-tickets",
    security(("cookie_auth" = []))
)]
pub async fn get_my_tickets(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<SubTicket>>> {
    let tickets = auth
        .api(&state)
        .send(BackendRequest::get("/employee/tickets"))
        .await?;
    Ok(Json(tickets))
}

/// GET /employee/tickets/{id}
#[utoipa::path(
    get,
    path = "/employee/tickets/{id}",
    params(("id" = i64, Path, description = "Sub-ticket ID")),
    responses(
        (status = 200, description = "Assignment found", body = SubTicket),
        (status = 404, description = "Not assigned to this employee")
    ),
    tag = "employee-tickets",
    security(("cookie_auth" = []))
)]
pub async fn get_my_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<SubTicket>> {
    let ticket = auth
        .api(&state)
        .send(BackendRequest::get(format!("/employee/tickets/{}", id)))
        .await?;
    Ok(Json(ticket))
}

/// PATCH /employee/tickets/{id}/status?status=
#[utoipa::path(
    patch,
    path = "/employee/tickets/{id}/status",
    params(("id" = i64, Path, description = "Sub-ticket ID"), StatusParam),
    responses(
        (status = 200, description = "Assignment status changed", body = SubTicket),
        (status = 422, description = "Only IN_PROGRESS or COMPLETED may be set")
    ),
    tag = "employee-tickets",
    security(("cookie_auth" = []))
)]
pub async fn update_my_ticket_status(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(param): Query<StatusParam>,
) -> AppResult<Json<SubTicket>> {
    if !param.status.employee_settable() {
        return Err(AppError::Validation(
            "Employees can only set status to IN_PROGRESS or COMPLETED".to_string(),
        ));
    }

    let request = BackendRequest::patch(format!("/employee/tickets/{}/status", id))
        .query_opt("status", Some(param.status.as_str()));
    let ticket = auth.api(&state).send(request).await?;
    Ok(Json(ticket))
}

/// PATCH /employee/tickets/{id}/notes
///
/// The body is the plain-text note, stored as-is.
#[utoipa::path(
    patch,
    path = "/employee/tickets/{id}/notes",
    params(("id" = i64, Path, description = "Sub-ticket ID")),
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 200, description = "Notes saved", body = SubTicket)
    ),
    tag = "employee-tickets",
    security(("cookie_auth" = []))
)]
pub async fn update_my_ticket_notes(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    notes: String,
) -> AppResult<Json<SubTicket>> {
    let request = BackendRequest::patch(format!("/employee/tickets/{}/notes", id)).text(notes);
    let ticket = auth.api(&state).send(request).await?;
    Ok(Json(ticket))
}
