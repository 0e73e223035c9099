//! Session token issuance and verification.
//!
//! The session credential is a stateless HS256-signed token carrying the
//! user's id and email. No expiry is set, so verification disables the
//! default `exp` requirement.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use shutterbook_core::UserId;

use crate::models::CurrentUser;

/// Token payload. Field names are part of the cookie contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Sign a session token for the given identity.
///
/// # Errors
///
/// Returns `jsonwebtoken::errors::Error` if encoding fails.
pub fn issue(
    secret: &SecretString,
    user_id: UserId,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        user_id,
        email: email.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
}

/// Verify a session token and return its claims.
///
/// A bad signature or unparseable token is a hard failure; callers must not
/// fall back to treating the request as anonymous.
///
/// # Errors
///
/// Returns `jsonwebtoken::errors::Error` if the signature is invalid or the
/// payload cannot be decoded.
pub fn verify(
    secret: &SecretString,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens carry no expiry
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}
