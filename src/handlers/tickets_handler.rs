use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{
        ticket::validate_assignees, ApprovalInput, AssignInput, Page, PageQuery, SubTicket,
        SubTicketView, Ticket, TicketInput, TicketStatus,
    },
    AppResult, AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusParam {
    pub status: TicketStatus,
}

/// GET /admin/tickets
#[utoipa::path(
    get,
    path = "/admin/tickets",
    params(PageQuery, TicketFilter),
    responses(
        (status = 200, description = "Page of tickets", body = Page<Ticket>)
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn get_tickets(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<TicketFilter>,
) -> AppResult<Json<Page<Ticket>>> {
    let request = BackendRequest::get("/admin/tickets")
        .query(paging.to_query())
        .query_opt("status", filter.status.map(TicketStatus::as_str))
        .query_opt("scheduledDate", filter.scheduled_date);
    let tickets = auth.api(&state).send(request).await?;
    Ok(Json(tickets))
}

/// GET /admin/tickets/{id}
#[utoipa::path(
    get,
    path = "/admin/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket with its sub-tickets", body = Ticket),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = auth
        .api(&state)
        .send(BackendRequest::get(format!("/admin/tickets/{}", id)))
        .await?;
    Ok(Json(ticket))
}

/// POST /admin/tickets
///
/// Rejected locally, with no backend call, unless 1 to 5 distinct employees
/// are named and the weight is within 1 to 5.
#[utoipa::path(
    post,
    path = "/admin/tickets",
    request_body = TicketInput,
    responses(
        (status = 201, description = "Ticket created and assigned", body = Ticket),
        (status = 422, description = "Validation failed")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<TicketInput>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    input.validate()?;

    let ticket: Ticket = auth
        .api(&state)
        .send(BackendRequest::post("/admin/tickets").json(&input)?)
        .await?;

    tracing::info!(
        ticket_id = ticket.id,
        ticket_number = %ticket.ticket_number,
        assignees = input.employee_ids.len(),
        "Ticket created"
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// PUT /admin/tickets/{id}
#[utoipa::path(
    put,
    path = "/admin/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket ID")),
    request_body = TicketInput,
    responses(
        (status = 200, description = "Ticket updated", body = Ticket),
        (status = 422, description = "Validation failed")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<TicketInput>,
) -> AppResult<Json<Ticket>> {
    input.validate()?;

    let ticket = auth
        .api(&state)
        .send(BackendRequest::put(format!("/admin/tickets/{}", id)).json(&input)?)
        .await?;
    Ok(Json(ticket))
}

/// DELETE /admin/tickets/{id}
#[utoipa::path(
    delete,
    path = "/admin/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket ID")),
    responses(
        (status = 204, description = "Ticket deleted")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    auth.api(&state)
        .send_empty(BackendRequest::delete(format!("/admin/tickets/{}", id)))
        .await?;
    tracing::info!(ticket_id = id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/tickets/{id}/assign
#[utoipa::path(
    post,
    path = "/admin/tickets/{id}/assign",
    params(("id" = i64, Path, description = "Ticket ID")),
    request_body = AssignInput,
    responses(
        (status = 200, description = "Employees assigned", body = Ticket),
        (status = 422, description = "Between 1 and 5 distinct employees required")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<AssignInput>,
) -> AppResult<Json<Ticket>> {
    validate_assignees(&input.employee_ids)?;

    let ticket = auth
        .api(&state)
        .send(BackendRequest::post(format!("/admin/tickets/{}/assign", id)).json(&input)?)
        .await?;
    Ok(Json(ticket))
}

/// PATCH /admin/tickets/{id}/status?status=
#[utoipa::path(
    patch,
    path = "/admin/tickets/{id}/status",
    params(("id" = i64, Path, description = "Ticket ID"), StatusParam),
    responses(
        (status = 200, description = "Ticket status changed", body = Ticket)
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn update_ticket_status(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(param): Query<StatusParam>,
) -> AppResult<Json<Ticket>> {
    let request = BackendRequest::patch(format!("/admin/tickets/{}/status", id))
        .query_opt("status", Some(param.status.as_str()));
    let ticket = auth.api(&state).send(request).await?;
    Ok(Json(ticket))
}

/// GET /admin/tickets/sub-tickets/pending-approval
#[utoipa::path(
    get,
    path = "/admin/tickets/sub-tickets/pending-approval",
    responses(
        (status = 200, description = "Completed assignments awaiting review", body = Vec<SubTicketView>)
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn get_pending_sub_tickets(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<SubTicketView>>> {
    let pending: Vec<SubTicket> = auth
        .api(&state)
        .send(BackendRequest::get("/admin/tickets/sub-tickets/pending-approval"))
        .await?;
    Ok(Json(pending.into_iter().map(SubTicketView::from).collect()))
}

/// POST /admin/tickets/sub-tickets/{id}/approve
#[utoipa::path(
    post,
    path = "/admin/tickets/sub-tickets/{id}/approve",
    params(("id" = i64, Path, description = "Sub-ticket ID")),
    request_body = ApprovalInput,
    responses(
        (status = 200, description = "Sub-ticket approved or rejected", body = SubTicketView),
        (status = 422, description = "Factors must be between 0 and 1")
    ),
    tag = "tickets",
    security(("cookie_auth" = []))
)]
pub async fn approve_sub_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<ApprovalInput>,
) -> AppResult<Json<SubTicketView>> {
    input.validate()?;

    let sub_ticket: SubTicket = auth
        .api(&state)
        .send(
            BackendRequest::post(format!("/admin/tickets/sub-tickets/{}/approve", id))
                .json(&input)?,
        )
        .await?;

    tracing::info!(
        sub_ticket_id = id,
        approved = input.approved,
        score = sub_ticket.score,
        "Sub-ticket reviewed"
    );
    Ok(Json(SubTicketView::from(sub_ticket)))
}
