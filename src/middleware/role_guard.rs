use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::{auth::required_role, extractors::resolve_session, AppError, AppState};

/// Keeps each role inside its own area of the portal.
///
/// `/admin/*` needs an ADMIN session and `/employee/*` an EMPLOYEE one. Anything
/// else is sent to `/login`. The backend still enforces authorization on every
/// call; this only decides where the browser may navigate.
pub async fn require_role(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(required) = required_role(request.uri().path()) else {
        return next.run(request).await;
    };

    match resolve_session(request.headers(), &state).await {
        Some(user) if user.role() == required => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Some(user) => {
            tracing::warn!(
                user_id = user.user_id(),
                role = user.role().as_str(),
                path = %request.uri().path(),
                "Role not allowed on path"
            );
            Redirect::to("/login").into_response()
        }
        None => AppError::SessionExpired.into_response(),
    }
}
