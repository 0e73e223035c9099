//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that implements the route-boundary
//! policy: business-rule limits become user-visible notice redirects, auth
//! failures redirect to the login page, missing entities render the 404 page,
//! and everything unexpected is captured to Sentry and surfaced as a generic
//! failure without leaking internals. Route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::routes::not_found_page;
use crate::services::auth::AuthError;
use crate::services::imagehost::ImageHostError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image host operation failed.
    #[error("Upload failed: {0}")]
    Upload(#[from] ImageHostError),

    /// The configured account cap is reached.
    #[error("Account capacity reached")]
    CapacityExceeded,

    /// The caller already holds the maximum number of posts.
    #[error("Post quota reached (limit {limit})")]
    QuotaExceeded { limit: i64 },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Upload(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            // Business-rule limits are notices, not error pages
            Self::CapacityExceeded => {
                Redirect::to("/?msg=Maximum+number+of+accounts+reached.+Please+contact+the+admin.")
                    .into_response()
            }
            Self::QuotaExceeded { limit } => {
                let msg = format!(
                    "You can keep at most {limit} posts. Delete one to make room for a new post."
                );
                Redirect::to(&format!("/your-posts?msg={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            // Auth failures redirect to login rather than render an error body
            Self::Unauthenticated
            | Self::Auth(
                AuthError::Unauthenticated
                | AuthError::InvalidToken(_)
                | AuthError::InvalidCredentials
                | AuthError::UserNotFound,
            ) => Redirect::to("/login").into_response(),

            Self::NotFound(_) => not_found_page().into_response(),

            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),

            Self::Upload(_) => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            )
                .into_response(),

            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) | Self::Auth(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    fn location_of(err: AppError) -> String {
        let response = err.into_response();
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("post 123".to_string());
        assert_eq!(err.to_string(), "Not found: post 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_auth_failures_redirect_to_login() {
        assert_eq!(location_of(AppError::Unauthenticated), "/login");
        assert_eq!(
            location_of(AppError::Auth(AuthError::InvalidCredentials)),
            "/login"
        );
    }

    #[test]
    fn test_capacity_redirects_to_feed_with_notice() {
        let location = location_of(AppError::CapacityExceeded);
        assert!(location.starts_with("/?msg="));
    }

    #[test]
    fn test_quota_redirects_to_own_posts_with_notice() {
        let location = location_of(AppError::QuotaExceeded { limit: 3 });
        assert!(location.starts_with("/your-posts?msg="));
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            status_of(AppError::NotFound("post".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        assert_eq!(
            status_of(AppError::Internal("connection dropped".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            status_of(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}
