pub mod metrics;
pub mod request_id;
pub mod role_guard;
pub mod secret_auth;

pub use metrics::metrics_middleware;
pub use request_id::request_id_middleware;
pub use role_guard::require_role;
pub use secret_auth::require_debug_key;
