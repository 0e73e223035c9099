//! Session cookie construction.
//!
//! The session credential is a signed stateless token carried in a cookie;
//! there is no server-side session store. Helpers here centralize the cookie
//! attributes so login, logout and the auth extractor agree on them.

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Session cookie name. Part of the HTTP surface contract.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Build the session cookie carrying a freshly signed token.
///
/// `secure` should come from `AppConfig::is_secure()` so the Secure flag
/// follows the deployed scheme.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

/// Build a removal cookie that clears the session.
#[must_use]
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    cookie.set_path("/");
    cookie
}
