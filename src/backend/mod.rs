pub mod api_session;
pub mod client;
pub mod request;

pub use api_session::ApiSession;
pub use client::BackendClient;
pub use request::BackendRequest;
