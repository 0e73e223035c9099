//! Session-related types.
//!
//! The identity decoded from the signed session token.

use serde::{Deserialize, Serialize};

use shutterbook_core::UserId;

/// Token-carried user identity.
///
/// Minimal data encoded into the session token to identify the logged-in
/// user. This is what authenticated handlers receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's normalized email address.
    pub email: String,
}
