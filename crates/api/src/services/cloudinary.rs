//! Cloudinary signed image upload.
//!
//! Uploads go straight from the server to Cloudinary's upload API using a
//! signed request, so no unsigned upload preset is needed. Signatures are
//! SHA-256 over the sorted parameters followed by the API secret; the
//! Cloudinary account must be set to accept SHA-256 signatures.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::config::CloudinaryConfig;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur when uploading to Cloudinary.
#[derive(Debug, Error)]
pub enum CloudinaryError {
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

/// An image stored on Cloudinary.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

/// Sign upload parameters: sort by key, join as `key=value&...`, append the
/// secret and hex-encode the SHA-256 digest. Empty values are not signed.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut pairs: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let message = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Client for Cloudinary's image upload API.
#[derive(Clone)]
pub struct CloudinaryClient {
    inner: Arc<CloudinaryClientInner>,
}

struct CloudinaryClientInner {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: SecretString,
    folder: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, CloudinaryError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            inner: Arc::new(CloudinaryClientInner {
                client,
                upload_url: format!(
                    "https://api.cloudinary.com/v1_1/{}/image/upload",
                    config.cloud_name
                ),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                folder: config.folder.clone(),
            }),
        })
    }

    /// Upload image bytes and return the stored image.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Cloudinary rejects the upload.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        content_type: &str,
    ) -> Result<UploadedImage, CloudinaryError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", self.inner.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            self.inner.api_secret.expose_secret(),
        );

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.inner.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.inner.folder.clone())
            .text("signature", signature);

        let response = self
            .inner
            .client
            .post(&self.inner.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Cloudinary upload failed"
            );
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let image: UploadedImage =
            serde_json::from_str(&body).map_err(|e| CloudinaryError::Parse(e.to_string()))?;

        tracing::info!(public_id = %image.public_id, "Image uploaded to Cloudinary");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_known_vector() {
        let signature = sign_params(
            &[("timestamp", "1315060510"), ("folder", "ecommerce")],
            "abcd",
        );
        assert_eq!(
            signature,
            "6bd8665198e1ce05d70385fcdc60ee1da8c7befc1831c6a5e6ff6fd77e8cad00"
        );
    }

    #[test]
    fn test_sign_params_skips_empty_values() {
        let with_empty = sign_params(
            &[("folder", "ecommerce"), ("tags", ""), ("timestamp", "1315060510")],
            "abcd",
        );
        let without = sign_params(
            &[("folder", "ecommerce"), ("timestamp", "1315060510")],
            "abcd",
        );
        assert_eq!(with_empty, without);
    }

    #[test]
    fn test_sign_params_depends_on_secret() {
        let params = [("timestamp", "1")];
        assert_ne!(sign_params(&params, "a"), sign_params(&params, "b"));
    }
}
