//! User domain types.

use chrono::{DateTime, Utc};

use shutterbook_core::{Email, UserId};

/// A registered account.
///
/// Users are created at signup and never updated or deleted by any exposed
/// operation. The password hash is an Argon2id PHC string; the plaintext is
/// never stored.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name; may be empty.
    pub last_name: String,
    /// Normalized email address (login key, unique).
    pub email: Email,
    /// Argon2id PHC-format password hash.
    pub password_hash: String,
    /// Whether the terms were accepted at signup (always true for persisted users).
    pub terms_accepted: bool,
    /// Profile photo URL (placeholder when signup supplied no file).
    pub photo_url: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full display name, with the possibly-empty last name handled.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Fields required to persist a new account.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub terms_accepted: bool,
    pub photo_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            terms_accepted: true,
            photo_url: "https://images.test/u/1.png".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_with_last_name() {
        assert_eq!(user("Ada", "Lovelace").display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_without_last_name() {
        assert_eq!(user("Ada", "").display_name(), "Ada");
    }
}
