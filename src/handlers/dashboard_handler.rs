use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{DayStatus, DayStatusView, JobCard, JobStatus, Page, SubTicket},
    AppResult, AppState,
};

/// How many of the employee's most recent cards the dashboard counts.
const RECENT_JOB_CARDS: u32 = 50;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub full_name: String,
    pub total_users: u64,
    pub total_generators: u64,
    pub total_tickets: u64,
    pub pending_approvals: usize,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardCounts {
    pub pending: u32,
    pub traveling: u32,
    pub started: u32,
    pub on_hold: u32,
    pub completed: u32,
    pub cancel: u32,
    pub total: u32,
}

impl JobCardCounts {
    pub fn tally(cards: &[JobCard]) -> Self {
        let mut counts = Self::default();
        for card in cards {
            let slot = match card.status {
                JobStatus::Pending => &mut counts.pending,
                JobStatus::Traveling => &mut counts.traveling,
                JobStatus::Started => &mut counts.started,
                JobStatus::OnHold => &mut counts.on_hold,
                JobStatus::Completed => &mut counts.completed,
                JobStatus::Cancel => &mut counts.cancel,
            };
            *slot += 1;
            counts.total += 1;
        }
        counts
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub full_name: String,
    pub day: DayStatusView,
    pub job_cards: JobCardCounts,
}

fn count_request(path: &str) -> BackendRequest {
    BackendRequest::get(path)
        .query_opt("page", Some(0))
        .query_opt("size", Some(1))
}

/// GET /admin/dashboard
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Totals for the admin landing page", body = AdminDashboard)
    ),
    tag = "dashboard",
    security(("cookie_auth" = []))
)]
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<AdminDashboard>> {
    let api = auth.api(&state);

    let (users, generators, tickets, pending) = tokio::try_join!(
        api.send::<Page<serde_json::Value>>(count_request("/admin/users")),
        api.send::<Page<serde_json::Value>>(count_request("/admin/generators")),
        api.send::<Page<serde_json::Value>>(count_request("/admin/tickets")),
        api.send::<Vec<SubTicket>>(BackendRequest::get(
            "/admin/tickets/sub-tickets/pending-approval"
        )),
    )?;

    Ok(Json(AdminDashboard {
        full_name: auth.session.full_name.clone(),
        total_users: users.total_elements,
        total_generators: generators.total_elements,
        total_tickets: tickets.total_elements,
        pending_approvals: pending.len(),
    }))
}

/// GET /employee/dashboard
#[utoipa::path(
    get,
    path = "/employee/dashboard",
    responses(
        (status = 200, description = "Day status and job-card counts", body = EmployeeDashboard)
    ),
    tag = "dashboard",
    security(("cookie_auth" = []))
)]
pub async fn employee_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<EmployeeDashboard>> {
    let api = auth.api(&state);

    let cards_request = BackendRequest::get("/employee/job-cards")
        .query_opt("page", Some(0))
        .query_opt("size", Some(RECENT_JOB_CARDS));

    let (day, cards) = tokio::try_join!(
        api.send::<DayStatus>(BackendRequest::get("/employee/day/status")),
        api.send::<Page<JobCard>>(cards_request),
    )?;

    Ok(Json(EmployeeDashboard {
        full_name: auth.session.full_name.clone(),
        day: day.into(),
        job_cards: JobCardCounts::tally(&cards.content),
    }))
}
