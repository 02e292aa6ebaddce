use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::client::{ensure_success, read_json, BackendClient};
use super::request::BackendRequest;
use crate::auth::{Session, SessionStore};
use crate::{AppError, AppResult};

struct Tokens {
    access: String,
    refresh: String,
}

/// Backend access on behalf of one portal session.
///
/// Every call carries the session's bearer token. A 401 triggers a single
/// refresh followed by a single retry; if either fails the session is
/// removed and the call resolves to [`AppError::SessionExpired`]. Refreshes
/// are serialized per session through [`SessionStore::refresh_lock`], so
/// concurrent requests hitting the same expired token share one refresh.
pub struct ApiSession {
    backend: BackendClient,
    sessions: SessionStore,
    session_id: String,
    tokens: Mutex<Tokens>,
}

impl ApiSession {
    pub fn new(
        backend: BackendClient,
        sessions: SessionStore,
        session_id: String,
        session: &Session,
    ) -> Self {
        Self {
            backend,
            sessions,
            session_id,
            tokens: Mutex::new(Tokens {
                access: session.access_token.clone(),
                refresh: session.refresh_token.clone(),
            }),
        }
    }

    /// Send and decode a JSON response.
    pub async fn send<T: DeserializeOwned>(&self, request: BackendRequest) -> AppResult<T> {
        let response = self.execute(&request).await?;
        read_json(response).await
    }

    /// Send and discard the response body.
    pub async fn send_empty(&self, request: BackendRequest) -> AppResult<()> {
        self.execute(&request).await?;
        Ok(())
    }

    async fn execute(&self, request: &BackendRequest) -> AppResult<reqwest::Response> {
        let token = self.tokens.lock().await.access.clone();
        let response = self.backend.dispatch(request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        tracing::debug!(path = %request.path, "Access token rejected, refreshing");
        let token = self.refreshed_token(&token).await?;

        let retry = self.backend.dispatch(request, Some(&token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %request.path, "Request rejected after token refresh");
            self.expire().await;
            return Err(AppError::SessionExpired);
        }
        ensure_success(retry).await
    }

    /// Returns a token newer than `stale`, refreshing only if nobody else has yet.
    async fn refreshed_token(&self, stale: &str) -> AppResult<String> {
        let mut tokens = self.tokens.lock().await;
        if tokens.access != stale {
            return Ok(tokens.access.clone());
        }

        // Other requests on this session wait here, then pick up the new token from the store
        let refresh_lock = self.sessions.refresh_lock(&self.session_id).await;
        let _refreshing = refresh_lock.lock().await;

        match self.sessions.get(&self.session_id).await {
            Some(stored) if stored.access_token != stale => {
                tokens.access = stored.access_token;
                tokens.refresh = stored.refresh_token;
                return Ok(tokens.access.clone());
            }
            Some(_) => {}
            None => {
                drop(tokens);
                return Err(AppError::SessionExpired);
            }
        }

        match self.backend.refresh(&tokens.refresh).await {
            Ok(refreshed) => {
                self.sessions
                    .update_tokens(
                        &self.session_id,
                        refreshed.access_token.clone(),
                        refreshed.refresh_token.clone(),
                    )
                    .await;
                tokens.access = refreshed.access_token;
                if let Some(refresh) = refreshed.refresh_token {
                    tokens.refresh = refresh;
                }
                tracing::info!("Access token refreshed");
                Ok(tokens.access.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                drop(tokens);
                self.expire().await;
                Err(AppError::SessionExpired)
            }
        }
    }

    async fn expire(&self) {
        self.sessions.remove(&self.session_id).await;
    }
}
