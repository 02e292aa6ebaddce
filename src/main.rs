mod auth;
mod backend;
mod config;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::{SessionStore, SubmissionLocks};
use backend::BackendClient;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub submissions: SubmissionLocks,
    pub metrics: Arc<MetricsState>,
}

impl AppState {
    pub fn new(config: AppConfig, metrics: Arc<MetricsState>) -> AppResult<Self> {
        let backend = BackendClient::new(&config.api_base_url, config.backend_timeout)?;
        let sessions = SessionStore::new(config.session_ttl);
        // A lock outliving the backend timeout belongs to a request that already gave up
        let submissions = SubmissionLocks::new(config.backend_timeout);

        Ok(Self {
            config,
            backend,
            sessions,
            submissions,
            metrics,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env first so RUST_LOG and LOG_FORMAT can come from it
    dotenvy::dotenv().ok();

    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,gms_portal=debug,tower_http=debug".into());

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    handlers::debug::mark_start();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let metrics_state = Arc::new(handlers::setup_metrics_recorder().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        e
    })?);
    tracing::info!("Metrics recorder initialized");

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, metrics_state)?);
    tracing::info!(
        backend = %state.config.api_base_url,
        session_ttl_secs = state.config.session_ttl.as_secs(),
        "Portal state initialized"
    );

    let app = startup::build_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
