//! Authentication extractors.
//!
//! Provides extractors for requiring a logged-in user in route handlers. The
//! identity comes from the signed token in the session cookie; there is no
//! server-side session lookup.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::session::{SESSION_COOKIE_NAME, clear_session_cookie};
use crate::models::CurrentUser;
use crate::services::auth::token;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// If no valid session token is present, the request is redirected to the
/// login page before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent or invalid.
pub enum AuthRejection {
    /// No session cookie present; redirect to login.
    MissingToken,
    /// Cookie present but the token failed verification. Treated as a hard
    /// failure: the stale cookie is cleared and the caller sent to login.
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => Redirect::to("/login").into_response(),
            Self::InvalidToken => {
                let jar = CookieJar::new().remove(clear_session_cookie());
                (jar, Redirect::to("/login")).into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar
            .get(SESSION_COOKIE_NAME)
            .ok_or(AuthRejection::MissingToken)?;

        match token::verify(&state.config().token_secret, cookie.value()) {
            Ok(claims) => Ok(Self(claims.into())),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting invalid session token");
                Err(AuthRejection::InvalidToken)
            }
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// logged in; pages like the feed render for guests too. A present-but-invalid
/// token is still a hard failure, not an anonymous fallthrough.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Ok(Self(None));
        };

        match token::verify(&state.config().token_secret, cookie.value()) {
            Ok(claims) => Ok(Self(Some(claims.into()))),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting invalid session token");
                Err(AuthRejection::InvalidToken)
            }
        }
    }
}
