//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// A single field-level validation failure from the signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The form field the message belongs to.
    pub field: &'static str,
    /// Human-readable message rendered next to the field.
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more signup fields failed validation.
    #[error("signup validation failed ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// Invalid credentials (wrong password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account matches the email.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// Session token is missing from the request.
    #[error("not authenticated")]
    Unauthenticated,

    /// Session token failed signature verification or parsing.
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
