use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    backend::{ApiSession, BackendRequest},
    extractors::AuthenticatedUser,
    models::{
        DayStatus, ImageUploadRequest, JobCard, JobCardView, JobStatus, Page, PageQuery,
        StatusUpdateInput,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobCardFilter {
    pub status: Option<JobStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ImageParams {
    pub file_name: Option<String>,
}

async fn fetch_day_status(api: &ApiSession) -> AppResult<DayStatus> {
    api.send(BackendRequest::get("/employee/day/status")).await
}

async fn fetch_job_card(api: &ApiSession, id: i64) -> AppResult<JobCard> {
    api.send(BackendRequest::get(format!("/employee/job-cards/{}", id)))
        .await
}

/// GET /employee/job-cards
#[utoipa::path(
    get,
    path = "/employee/job-cards",
    params(PageQuery, JobCardFilter),
    responses(
        (status = 200, description = "The employee's job cards with allowed transitions", body = Page<JobCardView>)
    ),
    tag = "job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_my_job_cards(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<JobCardFilter>,
) -> AppResult<Json<Page<JobCardView>>> {
    let api = auth.api(&state);
    let request = BackendRequest::get("/employee/job-cards")
        .query(paging.to_query())
        .query_opt("status", filter.status.map(JobStatus::as_str));

    let (day, cards) = tokio::try_join!(
        fetch_day_status(&api),
        api.send::<Page<JobCard>>(request)
    )?;

    Ok(Json(cards.map(|card| JobCardView::new(card, Some(&day)))))
}

/// GET /employee/job-cards/{id}
#[utoipa::path(
    get,
    path = "/employee/job-cards/{id}",
    params(("id" = i64, Path, description = "Job card ID")),
    responses(
        (status = 200, description = "Job card with allowed transitions", body = JobCardView),
        (status = 404, description = "Job card not found")
    ),
    tag = "job-cards",
    security(("cookie_auth" = []))
)]
pub async fn get_my_job_card(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<JobCardView>> {
    let api = auth.api(&state);
    let (day, card) = tokio::try_join!(fetch_day_status(&api), fetch_job_card(&api, id))?;
    Ok(Json(JobCardView::new(card, Some(&day))))
}

/// POST /employee/job-cards/{id}/status
///
/// Order of checks: location fix, in-flight lock, then the day gate and the
/// transition table against freshly fetched day status and card.
#[utoipa::path(
    post,
    path = "/employee/job-cards/{id}/status",
    params(("id" = i64, Path, description = "Job card ID")),
    request_body = StatusUpdateInput,
    responses(
        (status = 200, description = "Status updated", body = JobCardView),
        (status = 400, description = "Location missing or transition not allowed"),
        (status = 409, description = "Day closed, card finished, or an update is already in flight")
    ),
    tag = "job-cards",
    security(("cookie_auth" = []))
)]
pub async fn update_job_card_status(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<StatusUpdateInput>,
) -> AppResult<Json<JobCardView>> {
    let update = input.into_request()?;

    let _guard = state
        .submissions
        .try_acquire(&auth.session_id, id)
        .ok_or_else(|| {
            AppError::Conflict("A status update for this job card is already in progress".to_string())
        })?;

    let api = auth.api(&state);
    let (day, card) = tokio::try_join!(fetch_day_status(&api), fetch_job_card(&api, id))?;

    if let Some(notice) = day.notice() {
        return Err(AppError::Conflict(notice.to_string()));
    }
    if card.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Job card is already {}",
            card.status.as_str()
        )));
    }
    if !card.status.can_transition_to(update.new_status) {
        return Err(AppError::BadRequest(format!(
            "Cannot change status from {} to {}",
            card.status.as_str(),
            update.new_status.as_str()
        )));
    }

    let updated: JobCard = api
        .send(BackendRequest::post(format!("/employee/job-cards/{}/status", id)).json(&update)?)
        .await?;

    tracing::info!(
        job_card_id = id,
        user_id = auth.user_id(),
        from = card.status.as_str(),
        to = updated.status.as_str(),
        "Job card status updated"
    );

    Ok(Json(JobCardView::new(updated, Some(&day))))
}

/// POST /employee/job-cards/{id}/image
///
/// Raw image bytes in, base64 data URL out to the backend.
#[utoipa::path(
    post,
    path = "/employee/job-cards/{id}/image",
    params(("id" = i64, Path, description = "Job card ID"), ImageParams),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Image attached", body = JobCard),
        (status = 400, description = "Empty body or not an image"),
        (status = 413, description = "Image too large")
    ),
    tag = "job-cards",
    security(("cookie_auth" = []))
)]
pub async fn upload_job_card_image(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(params): Query<ImageParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<JobCard>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .filter(|v| v.starts_with("image/"))
        .ok_or_else(|| AppError::BadRequest("Please select an image".to_string()))?;

    if body.is_empty() {
        return Err(AppError::BadRequest("Please select an image".to_string()));
    }

    let upload = ImageUploadRequest {
        image_data: format!("data:{};base64,{}", content_type, STANDARD.encode(&body)),
        file_name: params.file_name,
        content_type: Some(content_type),
    };

    let card: JobCard = auth
        .api(&state)
        .send(BackendRequest::post(format!("/employee/job-cards/{}/image", id)).json(&upload)?)
        .await?;

    tracing::info!(job_card_id = id, bytes = body.len(), "Job card image uploaded");
    Ok(Json(card))
}
