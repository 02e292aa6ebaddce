use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{
        report::{csv_file_name, ot_tracking_csv, time_tracking_csv, ReportParams},
        OtTrackingReport, OtTrackingReportView, Page, ReportQuery, Role, TimeTrackingReport,
        TimeTrackingReportView, User,
    },
    AppResult, AppState,
};

const EMPLOYEE_PICKER_SIZE: u32 = 100;

async fn fetch_report<T: serde::de::DeserializeOwned>(
    state: &AppState,
    auth: &AuthenticatedUser,
    kind: &str,
    params: &ReportParams,
) -> AppResult<T> {
    let request = BackendRequest::get(format!("/admin/reports/{}", kind)).query(params.to_query());
    auth.api(state).send(request).await
}

fn csv_response(file_name: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /admin/reports/time-tracking
#[utoipa::path(
    get,
    path = "/admin/reports/time-tracking",
    params(ReportQuery),
    responses(
        (status = 200, description = "Daily work and overtime for one employee", body = TimeTrackingReportView),
        (status = 422, description = "Employee missing or start date after end date")
    ),
    tag = "reports",
    security(("cookie_auth" = []))
)]
pub async fn get_time_tracking_report(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<TimeTrackingReportView>> {
    let params = query.resolve_today()?;
    let report: TimeTrackingReport = fetch_report(&state, &auth, "time-tracking", &params).await?;
    Ok(Json(report.into()))
}

/// GET /admin/reports/ot-tracking
#[utoipa::path(
    get,
    path = "/admin/reports/ot-tracking",
    params(ReportQuery),
    responses(
        (status = 200, description = "Overtime breakdown and performance for one employee", body = OtTrackingReportView),
        (status = 422, description = "Employee missing or start date after end date")
    ),
    tag = "reports",
    security(("cookie_auth" = []))
)]
pub async fn get_ot_tracking_report(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<OtTrackingReportView>> {
    let params = query.resolve_today()?;
    let report: OtTrackingReport = fetch_report(&state, &auth, "ot-tracking", &params).await?;
    Ok(Json(report.into()))
}

/// GET /admin/reports/time-tracking.csv
#[utoipa::path(
    get,
    path = "/admin/reports/time-tracking.csv",
    params(ReportQuery),
    responses(
        (status = 200, description = "Time-tracking report as CSV", content_type = "text/csv", body = String)
    ),
    tag = "reports",
    security(("cookie_auth" = []))
)]
pub async fn export_time_tracking_csv(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let params = query.resolve_today()?;
    let report: TimeTrackingReport = fetch_report(&state, &auth, "time-tracking", &params).await?;

    let file_name = csv_file_name("time", &report.employee_name, &params);
    tracing::info!(
        employee_id = params.employee_id,
        rows = report.daily_records.len(),
        "Time-tracking CSV exported"
    );
    Ok(csv_response(file_name, time_tracking_csv(&report)?))
}

/// GET /admin/reports/ot-tracking.csv
#[utoipa::path(
    get,
    path = "/admin/reports/ot-tracking.csv",
    params(ReportQuery),
    responses(
        (status = 200, description = "Overtime report as CSV", content_type = "text/csv", body = String)
    ),
    tag = "reports",
    security(("cookie_auth" = []))
)]
pub async fn export_ot_tracking_csv(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let params = query.resolve_today()?;
    let report: OtTrackingReport = fetch_report(&state, &auth, "ot-tracking", &params).await?;

    let file_name = csv_file_name("ot", &report.employee_name, &params);
    tracing::info!(
        employee_id = params.employee_id,
        rows = report.daily_ot_records.len(),
        "OT-tracking CSV exported"
    );
    Ok(csv_response(file_name, ot_tracking_csv(&report)?))
}

/// GET /admin/reports/employees
#[utoipa::path(
    get,
    path = "/admin/reports/employees",
    responses(
        (status = 200, description = "Employees selectable for a report", body = Vec<User>)
    ),
    tag = "reports",
    security(("cookie_auth" = []))
)]
pub async fn get_report_employees(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let request = BackendRequest::get("/admin/users")
        .query_opt("page", Some(0))
        .query_opt("size", Some(EMPLOYEE_PICKER_SIZE))
        .query_opt("role", Some(Role::Employee.as_str()));
    let page: Page<User> = auth.api(&state).send(request).await?;
    Ok(Json(page.content))
}
