//! Client for the external image-hosting API.
//!
//! Uploaded photos are forwarded as multipart form data under a fixed logical
//! folder; the host returns a durable public URL plus an identifier used for
//! later deletion. A failed upload aborts the enclosing operation so no user
//! or post is ever persisted without a photo URL.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ImageHostConfig;

/// Errors that can occur when talking to the image host.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A stored image as reported by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredImage {
    /// Durable public URL.
    pub secure_url: String,
    /// Host-side identifier, needed to delete the image later.
    pub public_id: String,
}

/// Image host API client.
#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    api_url: String,
    folder: String,
}

impl ImageHostClient {
    /// Create a new image host client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImageHostConfig) -> Result<Self, ImageHostError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ImageHostError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            folder: config.folder.clone(),
        })
    }

    /// Upload an image and return its durable public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the host rejects the upload.
    /// Callers must treat this as aborting the enclosing operation.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredImage, ImageHostError> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ImageHostError::Parse(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.api_url))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let stored: StoredImage = response
            .json()
            .await
            .map_err(|e| ImageHostError::Parse(e.to_string()))?;

        Ok(stored)
    }

    /// Delete an uploaded image by the URL stored on the post.
    ///
    /// Best effort: post deletion proceeds even when this fails, so callers
    /// log and move on rather than propagating.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the host rejects the delete.
    pub async fn delete(&self, photo_url: &str) -> Result<(), ImageHostError> {
        let public_id = public_id_from_url(photo_url, &self.folder);

        let response = self
            .client
            .delete(format!("{}/destroy", self.api_url))
            .query(&[("public_id", public_id.as_str())])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Recover the host-side identifier from a stored URL.
///
/// The host files uploads as `<folder>/<name>`; the delivery URL ends with
/// `/<folder>/<name>.<ext>`.
fn public_id_from_url(photo_url: &str, folder: &str) -> String {
    let name = photo_url
        .rsplit('/')
        .next()
        .map(|last| last.split('.').next().unwrap_or(last))
        .unwrap_or(photo_url);
    format!("{folder}/{name}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url("https://images.test/v1/shutterbook/abc123.png", "shutterbook"),
            "shutterbook/abc123"
        );
    }

    #[test]
    fn test_public_id_from_url_without_extension() {
        assert_eq!(
            public_id_from_url("https://images.test/v1/shutterbook/abc123", "shutterbook"),
            "shutterbook/abc123"
        );
    }
}
