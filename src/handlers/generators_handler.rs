use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{Generator, GeneratorInput, Page, PageQuery},
    AppResult, AppState,
};

/// GET /admin/generators
#[utoipa::path(
    get,
    path = "/admin/generators",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of generators", body = Page<Generator>)
    ),
    tag = "generators",
    security(("cookie_auth" = []))
)]
pub async fn get_generators(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<Page<Generator>>> {
    let generators = auth
        .api(&state)
        .send(BackendRequest::get("/admin/generators").query(paging.to_query()))
        .await?;
    Ok(Json(generators))
}

/// GET /admin/generators/{id}
#[utoipa::path(
    get,
    path = "/admin/generators/{id}",
    params(("id" = i64, Path, description = "Generator ID")),
    responses(
        (status = 200, description = "Generator found", body = Generator),
        (status = 404, description = "Generator not found")
    ),
    tag = "generators",
    security(("cookie_auth" = []))
)]
pub async fn get_generator(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Generator>> {
    let generator = auth
        .api(&state)
        .send(BackendRequest::get(format!("/admin/generators/{}", id)))
        .await?;
    Ok(Json(generator))
}

/// POST /admin/generators
#[utoipa::path(
    post,
    path = "/admin/generators",
    request_body = GeneratorInput,
    responses(
        (status = 201, description = "Generator created", body = Generator),
        (status = 422, description = "Validation failed")
    ),
    tag = "generators",
    security(("cookie_auth" = []))
)]
pub async fn create_generator(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<GeneratorInput>,
) -> AppResult<(StatusCode, Json<Generator>)> {
    input.validate()?;

    let generator: Generator = auth
        .api(&state)
        .send(BackendRequest::post("/admin/generators").json(&input)?)
        .await?;

    tracing::info!(generator_id = generator.id, "Generator created");
    Ok((StatusCode::CREATED, Json(generator)))
}

/// PUT /admin/generators/{id}
#[utoipa::path(
    put,
    path = "/admin/generators/{id}",
    params(("id" = i64, Path, description = "Generator ID")),
    request_body = GeneratorInput,
    responses(
        (status = 200, description = "Generator updated", body = Generator),
        (status = 422, description = "Validation failed")
    ),
    tag = "generators",
    security(("cookie_auth" = []))
)]
pub async fn update_generator(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<GeneratorInput>,
) -> AppResult<Json<Generator>> {
    input.validate()?;

    let generator = auth
        .api(&state)
        .send(BackendRequest::put(format!("/admin/generators/{}", id)).json(&input)?)
        .await?;
    Ok(Json(generator))
}

/// DELETE /admin/generators/{id}
#[utoipa::path(
    delete,
    path = "/admin/generators/{id}",
    params(("id" = i64, Path, description = "Generator ID")),
    responses(
        (status = 204, description = "Generator deleted")
    ),
    tag = "generators",
    security(("cookie_auth" = []))
)]
pub async fn delete_generator(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    auth.api(&state)
        .send_empty(BackendRequest::delete(format!("/admin/generators/{}", id)))
        .await?;
    tracing::info!(generator_id = id, "Generator deleted");
    Ok(StatusCode::NO_CONTENT)
}
