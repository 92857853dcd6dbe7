//! Office preview conversion
//!
//! Office documents cannot be rendered locally, so their bytes are
//! forwarded to the backend conversion endpoint, which answers with a
//! directly renderable (presigned) preview URL. That URL is the entry's
//! sole renderable reference; no local thumbnail exists for this kind.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::fetch::build_client;

/// Conversion error type
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Transport-level failure
    #[error("Conversion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Conversion failed with status {0}")]
    Status(reqwest::StatusCode),

    /// Response body did not contain a usable preview URL
    #[error("Malformed conversion response: {0}")]
    MalformedResponse(String),

    /// Stub-injected failure (tests only)
    #[error("Conversion failed: {0}")]
    Other(String),
}

/// Converts fetched Office-document bytes into a renderable preview URL.
#[async_trait]
pub trait OfficeConverter: Send + Sync {
    async fn convert(&self, filename: &str, data: Bytes) -> Result<String, ConvertError>;
}

#[derive(Deserialize)]
struct TempPreviewResponse {
    presigned_url: String,
}

/// Production converter talking to the backend temp-preview endpoint.
pub struct HttpOfficeConverter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOfficeConverter {
    /// The conversion endpoint is a backend route, so the client carries
    /// the same session credential as the fetcher.
    pub fn new(config: &Config) -> Self {
        Self {
            client: build_client(config),
            base_url: config.backend_base_url.clone(),
        }
    }
}

#[async_trait]
impl OfficeConverter for HttpOfficeConverter {
    async fn convert(&self, filename: &str, data: Bytes) -> Result<String, ConvertError> {
        let part = Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/documents/temp-preview", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::Status(status));
        }

        let body: TempPreviewResponse = response
            .json()
            .await
            .map_err(|e| ConvertError::MalformedResponse(e.to_string()))?;

        if body.presigned_url.is_empty() {
            return Err(ConvertError::MalformedResponse(
                "empty presigned_url".to_string(),
            ));
        }

        Ok(body.presigned_url)
    }
}
