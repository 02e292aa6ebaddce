use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    handlers::job_cards_handler::JobCardFilter,
    models::{JobCard, JobCardApprovalInput, JobStatus, Page, PageQuery},
    AppResult, AppState,
};

/// GET /admin/job-cards
#[utoipa::path(
    get,
    path = "/admin/job-cards",
    params(PageQuery, JobCardFilter),
    responses(
        (status = 200, description = "Page of job cards", body = Page<JobCard>)
    ),
    tag = "admin-job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_job_cards(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<JobCardFilter>,
) -> AppResult<Json<Page<JobCard>>> {
    let request = BackendRequest::get("/admin/job-cards")
        .query(paging.to_query())
        .query_opt("status", filter.status.map(JobStatus::as_str));
    let cards = auth.api(&state).send(request).await?;
    Ok(Json(cards))
}

/// GET /admin/job-cards/{id}
#[utoipa::path(
    get,
    path = "/admin/job-cards/{id}",
    params(("id" = i64, Path, description = "Job card ID")),
    responses(
        (status = 200, description = "Job card found", body = JobCard),
        (status = 404, description = "Job card not found")
    ),
    tag = "admin-job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_job_card(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<JobCard>> {
    let card = auth
        .api(&state)
        .send(BackendRequest::get(format!("/admin/job-cards/{}", id)))
        .await?;
    Ok(Json(card))
}

/// GET /admin/job-cards/pending-approval
#[utoipa::path(
    get,
    path = "/admin/job-cards/pending-approval",
    responses(
        (status = 200, description = "Completed, unapproved job cards", body = Vec<JobCard>)
    ),
    tag = "admin-job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_pending_job_cards(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<JobCard>>> {
    let cards = auth
        .api(&state)
        .send(BackendRequest::get("/admin/job-cards/pending-approval"))
        .await?;
    Ok(Json(cards))
}

/// POST /admin/job-cards/{id}/approve
#[utoipa::path(
    post,
    path = "/admin/job-cards/{id}/approve",
    params(("id" = i64, Path, description = "Job card ID")),
    request_body = JobCardApprovalInput,
    responses(
        (status = 200, description = "Approval recorded", body = JobCard),
        (status = 400, description = "Job card not completed")
    ),
    tag = "admin-job-cards",
    security(("cookie_auth" = []))
)]
pub async fn approve_job_card(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<JobCardApprovalInput>,
) -> AppResult<Json<JobCard>> {
    let card = auth
        .api(&state)
        .send(BackendRequest::post(format!("/admin/job-cards/{}/approve", id)).json(&input)?)
        .await?;
    tracing::info!(job_card_id = id, approved = input.approved, "Job card reviewed");
    Ok(Json(card))
}

/// GET /admin/job-cards/ticket/{ticket_id}
#[utoipa::path(
    get,
    path = "/admin/job-cards/ticket/{ticket_id}",
    params(("ticket_id" = i64, Path, description = "Main ticket ID")),
    responses(
        (status = 200, description = "Job cards created for the ticket", body = Vec<JobCard>)
    ),
    tag = "admin-job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_job_cards_by_ticket(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(ticket_id): Path<i64>,
) -> AppResult<Json<Vec<JobCard>>> {
    let cards = auth
        .api(&state)
        .send(BackendRequest::get(format!("/admin/job-cards/ticket/{}", ticket_id)))
        .await?;
    Ok(Json(cards))
}
