//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::imagehost::{ImageHostClient, ImageHostError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    image_host: ImageHostClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the image host client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, ImageHostError> {
        let image_host = ImageHostClient::new(&config.image_host)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                image_host,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the image host client.
    #[must_use]
    pub fn image_host(&self) -> &ImageHostClient {
        &self.inner.image_host
    }
}
