use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth::{sign_session_id, Session, SESSION_COOKIE},
    extractors::{resolve_session, AuthenticatedUser},
    models::{LoginInput, LoginResponse, Role},
    AppResult, AppState,
};

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Username or password missing")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    input.validate()?;

    let auth = state.backend.login(&input).await?;

    // Logging in again replaces whatever session this browser had
    if let Some(previous) = resolve_session(&headers, &state).await {
        state.sessions.remove(&previous.session_id).await;
    }

    let session = Session::from(auth);
    let response = LoginResponse {
        user_id: session.user_id,
        username: session.username.clone(),
        full_name: session.full_name.clone(),
        role: session.role,
        redirect: session.role.home_path().to_string(),
    };

    let session_id = state.sessions.create(session).await;
    let cookie_value = sign_session_id(&session_id, &state.config.session_secret)?;

    tracing::info!(
        user_id = response.user_id,
        role = response.role.as_str(),
        "User logged in"
    );

    Ok((
        jar.add(session_cookie(cookie_value, state.config.cookie_secure)),
        Json(response),
    ))
}

/// POST /logout
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Session cleared; redirect to /login")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(user) = resolve_session(&headers, &state).await {
        // Backend logout is best effort; the local session goes regardless
        if let Err(e) = state
            .backend
            .logout(&user.session.access_token, user.user_id())
            .await
        {
            tracing::warn!(error = %e, user_id = user.user_id(), "Backend logout failed");
        }
        state.sessions.remove(&user.session_id).await;
        tracing::info!(user_id = user.user_id(), "User logged out");
    }

    (jar.remove(removal_cookie()), Redirect::to("/login"))
}

/// GET /
pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    match resolve_session(&headers, &state).await {
        Some(user) => Redirect::to(user.role().home_path()),
        None => Redirect::to("/login"),
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

/// GET /me
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current portal user", body = CurrentUser),
        (status = 303, description = "No session; redirect to /login")
    ),
    tag = "auth",
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn get_me(auth: AuthenticatedUser) -> Json<CurrentUser> {
    Json(CurrentUser {
        user_id: auth.session.user_id,
        username: auth.session.username,
        full_name: auth.session.full_name,
        role: auth.session.role,
    })
}

/// GET /login
pub async fn login_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(user) = resolve_session(&headers, &state).await {
        return Redirect::to(user.role().home_path()).into_response();
    }
    Html(LOGIN_PAGE).into_response()
}

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generator Maintenance Portal</title>
</head>
<body>
    <h1>Sign in</h1>
    <form id="login">
        <input name="username" placeholder="Username" autocomplete="username" required>
        <input name="password" type="password" placeholder="Password" autocomplete="current-password" required>
        <button type="submit">Login</button>
    </form>
    <p id="error" role="alert"></p>
    <script>
        document.getElementById('login').addEventListener('submit', async (event) => {
            event.preventDefault();
            const form = new FormData(event.target);
            const response = await fetch('/login', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ username: form.get('username'), password: form.get('password') }),
            });
            const body = await response.json();
            if (response.ok) {
                window.location.href = body.redirect;
            } else {
                document.getElementById('error').textContent = body.error || 'Login failed';
            }
        });
    </script>
</body>
</html>
"#;
