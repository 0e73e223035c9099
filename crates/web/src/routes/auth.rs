//! Authentication route handlers.
//!
//! Signup, login and logout. Signup is a multipart form (it carries the
//! profile photo); validation failures re-render the form with itemized
//! messages and the submitted values minus passwords.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_session_cookie, session_cookie};
use crate::routes::MessageQuery;
use crate::services::auth::{AuthError, AuthService, SignupInput, token};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// A file lifted out of the multipart stream.
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Parsed signup submission: the text fields plus the optional photo.
struct SignupSubmission {
    input: SignupInput,
    photo: Option<UploadedFile>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub logged_in: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub email: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub logged_in: bool,
    pub errors: Vec<String>,
    pub old: OldSignupInput,
}

/// Previously submitted signup values, re-displayed after validation failure.
/// Passwords are never echoed back.
#[derive(Default)]
pub struct OldSignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&SignupInput> for OldSignupInput {
    fn from(input: &SignupInput) -> Self {
        Self {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(viewer): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        logged_in: viewer.is_some(),
        error: None,
        notice: query.msg,
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// A missing account and a wrong password are reported distinctly, but
/// neither issues a token or sets a cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    let user = match auth.login(&form.email, &form.password).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => {
            return Ok(LoginTemplate {
                logged_in: false,
                error: Some("User not found. Please check your email or sign up.".to_string()),
                notice: None,
                email: form.email,
            }
            .into_response());
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("login rejected: wrong password");
            return Ok(LoginTemplate {
                logged_in: false,
                error: Some("Password is wrong".to_string()),
                notice: None,
                email: form.email,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let token = token::issue(&state.config().token_secret, user.id, user.email.as_str())
        .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))?;

    let jar = jar.add(session_cookie(token, state.config().is_secure()));

    Ok((jar, Redirect::to("/your-posts")).into_response())
}

/// Handle logout: clear the session cookie.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(clear_session_cookie());
    (jar, Redirect::to("/"))
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(OptionalAuth(viewer): OptionalAuth) -> impl IntoResponse {
    SignupTemplate {
        logged_in: viewer.is_some(),
        errors: Vec::new(),
        old: OldSignupInput::default(),
    }
}

/// Handle signup form submission (multipart).
///
/// Order matches the original flow: validate, check the account cap, upload
/// the photo, persist. A failed upload aborts before anything is persisted.
pub async fn signup(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let SignupSubmission { input, photo } = read_signup(multipart).await?;

    if let Err(errors) = input.validate() {
        let messages = errors.into_iter().map(|e| e.message).collect();
        return Ok(validation_response(&input, messages));
    }

    let auth = AuthService::new(state.pool());

    // Account cap is a capacity condition, not a validation error
    if auth.user_count().await? >= state.config().limits.max_users {
        return Err(AppError::CapacityExceeded);
    }

    let photo_url = match photo {
        Some(file) => {
            state
                .image_host()
                .upload(&file.file_name, &file.content_type, file.data)
                .await?
                .secure_url
        }
        None => state.config().default_avatar_url.clone(),
    };

    match auth.register(&input, photo_url).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account created");
            Ok(Redirect::to("/login?msg=Account+created+successfully").into_response())
        }
        Err(AuthError::EmailTaken) => Ok(validation_response(
            &input,
            vec!["An account with this email already exists".to_string()],
        )),
        Err(AuthError::Validation(errors)) => {
            let messages = errors.into_iter().map(|e| e.message).collect();
            Ok(validation_response(&input, messages))
        }
        Err(e) => Err(e.into()),
    }
}

/// Re-render the signup form with itemized messages and the old input.
fn validation_response(input: &SignupInput, messages: Vec<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        SignupTemplate {
            logged_in: false,
            errors: messages,
            old: OldSignupInput::from(input),
        },
    )
        .into_response()
}

/// Pull the signup fields out of the multipart stream.
///
/// Field names are part of the form contract. An empty `profilePhoto` part
/// (no file selected) is treated as absent.
async fn read_signup(mut multipart: Multipart) -> Result<SignupSubmission> {
    let mut input = SignupInput::default();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "firstName" => input.first_name = read_text(field).await?,
            "lastName" => input.last_name = read_text(field).await?,
            "email" => input.email = read_text(field).await?,
            "password" => input.password = read_text(field).await?,
            "confirmPassword" => input.confirm_password = read_text(field).await?,
            "terms" => input.terms_accepted = read_text(field).await? == "on",
            "profilePhoto" => photo = read_file(field).await?,
            _ => {}
        }
    }

    Ok(SignupSubmission { input, photo })
}

/// Read a text field from the multipart stream.
pub(super) async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart field: {e}")))
}

/// Read a file field from the multipart stream; empty uploads count as absent.
pub(super) async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<UploadedFile>> {
    let file_name = field.file_name().unwrap_or("photo").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart field: {e}")))?;

    if data.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadedFile {
        file_name,
        content_type,
        data: data.to_vec(),
    }))
}
