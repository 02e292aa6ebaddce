use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use std::future::Future;
use std::sync::Arc;

use crate::{
    auth::{verify_session_cookie, Session, SESSION_COOKIE},
    backend::ApiSession,
    models::Role,
    AppError, AppState,
};

/// Logged-in portal user, resolved from the signed `gms_session` cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub session_id: String,
    pub session: Session,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.session.user_id
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    /// Backend access with this user's tokens.
    pub fn api(&self, state: &AppState) -> ApiSession {
        ApiSession::new(
            state.backend.clone(),
            state.sessions.clone(),
            self.session_id.clone(),
            &self.session,
        )
    }
}

/// Look up the session behind the request's cookie.
/// Missing, tampered and expired cookies all resolve to `None`.
pub async fn resolve_session(headers: &HeaderMap, state: &AppState) -> Option<AuthenticatedUser> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(SESSION_COOKIE)?;

    let session_id = match verify_session_cookie(cookie.value(), &state.config.session_secret) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid session cookie");
            return None;
        }
    };

    let session = state.sessions.get(&session_id).await?;
    Some(AuthenticatedUser { session_id, session })
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        // The role guard already resolved the session for /admin and /employee routes
        let resolved = parts.extensions.get::<AuthenticatedUser>().cloned();
        let headers = parts.headers.clone();
        let state = state.clone();

        async move {
            if let Some(user) = resolved {
                return Ok(user);
            }
            resolve_session(&headers, &state)
                .await
                .ok_or(AppError::SessionExpired)
        }
    }
}
