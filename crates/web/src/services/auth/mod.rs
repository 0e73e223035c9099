//! Authentication service.
//!
//! Signup validation, Argon2id password hashing, credential verification and
//! session token handling.

mod error;
pub mod token;

pub use error::{AuthError, FieldError};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use regex::Regex;
use sqlx::PgPool;

use shutterbook_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum first-name length.
const MIN_FIRST_NAME_LENGTH: usize = 2;

/// Special characters a password must draw from.
const PASSWORD_SPECIAL_CHARS: &[char] = &['!', '@', '&'];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid name pattern"));

/// Raw signup form values, as submitted.
///
/// Validation is per-field so every violated rule is reported at once, the
/// way the signup page renders them.
#[derive(Debug, Default, Clone)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

impl SignupInput {
    /// Validate every field, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns the full list of field errors if any rule is violated.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = self.first_name.trim();
        if first_name.len() < MIN_FIRST_NAME_LENGTH {
            errors.push(FieldError::new(
                "firstName",
                format!("First name should be at least {MIN_FIRST_NAME_LENGTH} characters long"),
            ));
        } else if !NAME_RE.is_match(first_name) {
            errors.push(FieldError::new(
                "firstName",
                "First name should contain only alphabets",
            ));
        }

        let last_name = self.last_name.trim();
        if !last_name.is_empty() && !NAME_RE.is_match(last_name) {
            errors.push(FieldError::new(
                "lastName",
                "Last name should contain only alphabets",
            ));
        }

        if Email::parse(&self.email).is_err() {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }

        errors.extend(validate_password(&self.password));

        if self.confirm_password.trim() != self.password.trim() {
            errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
        }

        if !self.terms_accepted {
            errors.push(FieldError::new(
                "terms",
                "Please accept the terms and conditions",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Check each password rule, naming the missing character class.
fn validate_password(password: &str) -> Vec<FieldError> {
    let password = password.trim();
    let mut errors = Vec::new();

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("Password should be at least {MIN_PASSWORD_LENGTH} characters long"),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password should contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "Password should contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "Password should contain at least one number",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(&c)) {
        errors.push(FieldError::new(
            "password",
            "Password should contain at least one special character",
        ));
    }

    errors
}

/// Authentication service.
///
/// Handles account creation and credential verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Count registered accounts (for the configured account cap).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn user_count(&self) -> Result<i64, AuthError> {
        Ok(self.users.count().await?)
    }

    /// Persist a validated signup as a new account.
    ///
    /// The input must already have passed [`SignupInput::validate`]; this
    /// hashes the password and stores the normalized email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email cannot be normalized.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        input: &SignupInput,
        photo_url: String,
    ) -> Result<User, AuthError> {
        let email = Email::parse(&input.email).map_err(|_| {
            AuthError::Validation(vec![FieldError::new("email", "Please enter a valid email")])
        })?;

        let password_hash = hash_password(input.password.trim())?;

        let new_user = NewUser {
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            email,
            password_hash,
            terms_accepted: input.terms_accepted,
            photo_url,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

        Ok(user)
    }

    /// Verify credentials for login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches the email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password using Argon2id with a per-user random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> SignupInput {
        SignupInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "Abcdef1!".to_string(),
            confirm_password: "Abcdef1!".to_string(),
            terms_accepted: true,
        }
    }

    fn messages_for(input: &SignupInput, field: &str) -> Vec<String> {
        match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .into_iter()
                .filter(|e| e.field == field)
                .map(|e| e.message)
                .collect(),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_empty_last_name_allowed() {
        let mut input = valid_input();
        input.last_name = String::new();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_short_first_name() {
        let mut input = valid_input();
        input.first_name = "A".to_string();
        let msgs = messages_for(&input, "firstName");
        assert!(msgs.iter().any(|m| m.contains("at least 2 characters")));
    }

    #[test]
    fn test_non_alphabetic_first_name() {
        let mut input = valid_input();
        input.first_name = "Ada99".to_string();
        let msgs = messages_for(&input, "firstName");
        assert!(msgs.iter().any(|m| m.contains("only alphabets")));
    }

    #[test]
    fn test_invalid_email() {
        let mut input = valid_input();
        input.email = "not-an-email".to_string();
        assert!(!messages_for(&input, "email").is_empty());
    }

    #[test]
    fn test_password_missing_uppercase() {
        let mut input = valid_input();
        input.password = "abcdef1!".to_string();
        input.confirm_password = input.password.clone();
        let msgs = messages_for(&input, "password");
        assert!(msgs.iter().any(|m| m.contains("uppercase")));
    }

    #[test]
    fn test_password_missing_lowercase() {
        let mut input = valid_input();
        input.password = "ABCDEF1!".to_string();
        input.confirm_password = input.password.clone();
        let msgs = messages_for(&input, "password");
        assert!(msgs.iter().any(|m| m.contains("lowercase")));
    }

    #[test]
    fn test_password_missing_digit() {
        let mut input = valid_input();
        input.password = "Abcdefg!".to_string();
        input.confirm_password = input.password.clone();
        let msgs = messages_for(&input, "password");
        assert!(msgs.iter().any(|m| m.contains("number")));
    }

    #[test]
    fn test_password_missing_special_char() {
        let mut input = valid_input();
        input.password = "Abcdefg1".to_string();
        input.confirm_password = input.password.clone();
        let msgs = messages_for(&input, "password");
        assert!(msgs.iter().any(|m| m.contains("special character")));
    }

    #[test]
    fn test_password_too_short_reports_length() {
        let mut input = valid_input();
        input.password = "Ab1!".to_string();
        input.confirm_password = input.password.clone();
        let msgs = messages_for(&input, "password");
        assert!(msgs.iter().any(|m| m.contains("at least 8 characters")));
    }

    #[test]
    fn test_password_mismatch() {
        let mut input = valid_input();
        input.confirm_password = "Different1!".to_string();
        assert!(!messages_for(&input, "confirmPassword").is_empty());
    }

    #[test]
    fn test_terms_not_accepted() {
        let mut input = valid_input();
        input.terms_accepted = false;
        assert!(!messages_for(&input, "terms").is_empty());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let input = SignupInput::default();
        let errors = input.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"firstName"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
        assert!(fields.contains(&"terms"));
    }

    #[test]
    fn test_hash_password_not_plaintext() {
        let hash = hash_password("Abcdef1!").unwrap();
        assert!(!hash.contains("Abcdef1!"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Abcdef1!").unwrap();
        let b = hash_password("Abcdef1!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let hash = hash_password("Abcdef1!").unwrap();
        assert!(verify_password("Abcdef1!", &hash).is_ok());
        assert!(matches!(
            verify_password("WrongPass1!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
