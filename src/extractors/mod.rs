pub mod auth;

pub use auth::{resolve_session, AuthenticatedUser};
