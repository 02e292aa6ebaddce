use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    backend::BackendRequest,
    extractors::AuthenticatedUser,
    models::{Page, PageQuery, Role, User, UserInput},
    AppResult, AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    pub role: Option<Role>,
}

/// GET /admin/users
#[utoipa::path(
    get,
    path = "/admin/users",
    params(PageQuery, UserFilter),
    responses(
        (status = 200, description = "Page of users", body = Page<User>)
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Page<User>>> {
    let request = BackendRequest::get("/admin/users")
        .query(paging.to_query())
        .query_opt("role", filter.role.map(|r| r.as_str()));
    let users = auth.api(&state).send(request).await?;
    Ok(Json(users))
}

/// GET /admin/users/{id}
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = auth
        .api(&state)
        .send(BackendRequest::get(format!("/admin/users/{}", id)))
        .await?;
    Ok(Json(user))
}

/// POST /admin/users
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 422, description = "Validation failed")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<UserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    input.validate_for_create()?;

    let user: User = auth
        .api(&state)
        .send(BackendRequest::post("/admin/users").json(&input)?)
        .await?;

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /admin/users/{id}
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserInput,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 422, description = "Validation failed")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UserInput>,
) -> AppResult<Json<User>> {
    input.validate()?;

    let user = auth
        .api(&state)
        .send(BackendRequest::put(format!("/admin/users/{}", id)).json(&input)?)
        .await?;
    Ok(Json(user))
}

/// DELETE /admin/users/{id}
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted")
    ),
    tag = "users",
    security(("cookie_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    auth.api(&state)
        .send_empty(BackendRequest::delete(format!("/admin/users/{}", id)))
        .await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
