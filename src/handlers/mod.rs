pub mod admin_job_cards_handler;
pub mod auth_handler;
pub mod dashboard_handler;
pub mod day_handler;
pub mod debug;
pub mod employee_tickets_handler;
pub mod generators_handler;
pub mod health;
pub mod job_cards_handler;
pub mod metrics;
pub mod reports_handler;
pub mod tickets_handler;
pub mod users_handler;

pub use debug::debug_handler;
pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
