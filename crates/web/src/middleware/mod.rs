//! HTTP middleware and extractors.
//!
//! - [`auth`] - `RequireAuth`/`OptionalAuth` extractors over the session cookie
//! - [`session`] - session cookie construction and removal

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth};
pub use session::{SESSION_COOKIE_NAME, clear_session_cookie, session_cookie};
