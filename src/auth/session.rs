use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{AuthResponse, Role};

pub const SESSION_COOKIE: &str = "gms_session";

const MAX_SESSIONS: u64 = 10_000;

/// Everything the portal keeps for a logged-in browser.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            role: auth.role,
            user_id: auth.user_id,
            username: auth.username,
            full_name: auth.full_name,
            created_at: Utc::now(),
        }
    }
}

/// Server-side session records keyed by an opaque id.
/// Entries expire after `idle_ttl` without access.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
    /// One token refresh at a time per session, across all in-flight requests
    refresh_locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(idle_ttl)
            .max_capacity(MAX_SESSIONS)
            .build();
        let refresh_locks = Cache::builder()
            .time_to_idle(idle_ttl)
            .max_capacity(MAX_SESSIONS)
            .build();
        Self {
            sessions,
            refresh_locks,
        }
    }

    /// Store a session and return its new id.
    pub async fn create(&self, session: Session) -> String {
        let session_id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(session_id.clone(), session).await;
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).await
    }

    /// Swap in refreshed tokens. A refresh token is only replaced when the backend rotated it.
    pub async fn update_tokens(
        &self,
        session_id: &str,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Option<Session> {
        let mut session = self.sessions.get(session_id).await?;
        session.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            session.refresh_token = refresh_token;
        }
        self.sessions
            .insert(session_id.to_string(), session.clone())
            .await;
        Some(session)
    }

    /// Lock held while a session's tokens are being refreshed.
    pub async fn refresh_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .get_with(session_id.to_string(), async { Arc::new(Mutex::new(())) })
            .await
    }

    pub async fn remove(&self, session_id: &str) -> Option<Session> {
        self.refresh_locks.invalidate(session_id).await;
        self.sessions.remove(session_id).await
    }

    pub async fn active_count(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }
}
