//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHUTTERBOOK_DATABASE_URL` - `PostgreSQL` connection string
//! - `SHUTTERBOOK_BASE_URL` - Public URL for the site
//! - `SHUTTERBOOK_TOKEN_SECRET` - Session token signing secret (min 32 chars)
//! - `SHUTTERBOOK_IMAGE_API_URL` - Image host upload endpoint
//! - `SHUTTERBOOK_IMAGE_API_KEY` - Image host API key
//!
//! ## Optional
//! - `SHUTTERBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `SHUTTERBOOK_PORT` - Listen port (default: 3005)
//! - `SHUTTERBOOK_IMAGE_FOLDER` - Logical upload folder (default: shutterbook)
//! - `SHUTTERBOOK_MAX_USERS` - Account cap (default: 3)
//! - `SHUTTERBOOK_MAX_POSTS_PER_USER` - Per-user post quota (default: 3)
//! - `SHUTTERBOOK_DEFAULT_AVATAR_URL` - Placeholder profile photo
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session token signing secret
    pub token_secret: SecretString,
    /// Image host configuration
    pub image_host: ImageHostConfig,
    /// Business-rule limits
    pub limits: LimitsConfig,
    /// Placeholder profile photo used when signup supplies no file
    pub default_avatar_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Image host API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ImageHostConfig {
    /// Upload endpoint of the external image host
    pub api_url: String,
    /// API key (server-side only)
    pub api_key: SecretString,
    /// Logical folder uploads are filed under
    pub folder: String,
}

impl std::fmt::Debug for ImageHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHostConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Hard business-rule limits, read once at startup.
///
/// These replace the literals scattered through the original handlers: the
/// account cap and the per-user post quota are both configuration.
#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    /// Maximum number of accounts that may exist.
    pub max_users: i64,
    /// Maximum number of posts a single user may hold concurrently.
    pub max_posts_per_user: i64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder/length checks).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHUTTERBOOK_DATABASE_URL")?;
        let host = get_env_or_default("SHUTTERBOOK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHUTTERBOOK_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("SHUTTERBOOK_PORT", "3005")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHUTTERBOOK_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("SHUTTERBOOK_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHUTTERBOOK_BASE_URL".to_string(), e.to_string())
        })?;
        let token_secret = get_validated_secret("SHUTTERBOOK_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "SHUTTERBOOK_TOKEN_SECRET")?;

        let image_host = ImageHostConfig::from_env()?;
        let limits = LimitsConfig::from_env()?;
        let default_avatar_url = get_env_or_default(
            "SHUTTERBOOK_DEFAULT_AVATAR_URL",
            "https://static.shutterbook.dev/avatars/placeholder.png",
        );
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            token_secret,
            image_host,
            limits,
            default_avatar_url,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the Secure cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ImageHostConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: get_required_env("SHUTTERBOOK_IMAGE_API_URL")?,
            api_key: get_required_secret("SHUTTERBOOK_IMAGE_API_KEY")?,
            folder: get_env_or_default("SHUTTERBOOK_IMAGE_FOLDER", "shutterbook"),
        })
    }
}

impl LimitsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_users: get_limit("SHUTTERBOOK_MAX_USERS", 3)?,
            max_posts_per_user: get_limit("SHUTTERBOOK_MAX_POSTS_PER_USER", 3)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a positive integer limit with a default.
fn get_limit(key: &str, default: i64) -> Result<i64, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let value = raw
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value < 1 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be at least 1 (got {value})"),
        ));
    }
    Ok(value)
}

/// Validate that the token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-signing-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_token_secret(&secret, "TEST_TOKEN").is_err());
    }

    #[test]
    fn test_validate_token_secret_valid_length() {
        let secret = SecretString::from("x".repeat(32));
        assert!(validate_token_secret(&secret, "TEST_TOKEN").is_ok());
    }

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3005,
            base_url: "http://localhost:3005".to_string(),
            token_secret: SecretString::from("x".repeat(32)),
            image_host: ImageHostConfig {
                api_url: "https://images.test/upload".to_string(),
                api_key: SecretString::from("k".repeat(20)),
                folder: "shutterbook".to_string(),
            },
            limits: LimitsConfig {
                max_users: 3,
                max_posts_per_user: 3,
            },
            default_avatar_url: "https://static.test/placeholder.png".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3005);
    }

    #[test]
    fn test_is_secure() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = "https://shutterbook.dev".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_image_host_debug_redacts_api_key() {
        let config = test_config();
        let debug_output = format!("{:?}", config.image_host);
        assert!(debug_output.contains("https://images.test/upload"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(&"k".repeat(20)));
    }

    #[test]
    fn test_get_limit_default_and_bounds() {
        // Unset variable falls back to the default
        assert_eq!(get_limit("SHUTTERBOOK_TEST_UNSET_LIMIT", 3).unwrap(), 3);
    }
}
