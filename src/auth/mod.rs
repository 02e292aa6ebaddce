pub mod routes;
pub mod session;
pub mod session_token;
pub mod submission;

pub use routes::required_role;
pub use session::{Session, SessionStore, SESSION_COOKIE};
pub use session_token::{sign_session_id, verify_session_cookie};
pub use submission::SubmissionLocks;
