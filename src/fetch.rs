//! Document fetching
//!
//! [`DocumentFetcher`] is the seam between the preload pipelines and the
//! network. The production implementation wraps a shared `reqwest` client
//! carrying the session credential; tests substitute instrumented stubs.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use thiserror::Error;

use crate::config::Config;
use crate::descriptor::DocumentDescriptor;

/// Fetch error type
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Download failed with status {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Stub-injected failure (tests only)
    #[error("Fetch failed: {0}")]
    Other(String),
}

/// Transport-layer scheduling preference for a fetch.
///
/// A hint only: it never changes logical concurrency or completion
/// semantics. The HTTP implementation maps `High` to an RFC 9218
/// `Priority: u=1` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPriority {
    High,
    #[default]
    Auto,
}

/// Downloads document bytes from the backend or a direct URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Build the download URL for a descriptor.
    ///
    /// An explicit remote-storage path is preferred, then a direct URL,
    /// then the backend's id-keyed download endpoint.
    fn download_url(&self, doc: &DocumentDescriptor) -> String;

    /// Fetch the full body at `url`.
    async fn fetch(&self, url: &str, priority: FetchPriority) -> Result<Bytes, FetchError>;
}

/// Build an HTTP client carrying the session credential as a default
/// `Authorization` header, shared by every backend-facing component.
///
/// Falls back to a default client if the session header cannot be
/// installed (an invalid token would fail every request anyway).
pub(crate) fn build_client(config: &Config) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    if let Some(token) = &config.session_token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Session token is not a valid header value; ignoring"),
        }
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client ({}), using defaults", e);
            reqwest::Client::new()
        })
}

/// `reqwest`-backed fetcher carrying the session credential.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher from pipeline configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: build_client(config),
            base_url: config.backend_base_url.clone(),
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    fn download_url(&self, doc: &DocumentDescriptor) -> String {
        if let Some(path) = &doc.s3_path {
            return format!(
                "{}/files/download?s3_path={}",
                self.base_url,
                urlencoding::encode(path)
            );
        }
        if let Some(url) = &doc.url {
            return url.clone();
        }
        format!(
            "{}/files/download?document_id={}",
            self.base_url,
            urlencoding::encode(&doc.id)
        )
    }

    async fn fetch(&self, url: &str, priority: FetchPriority) -> Result<Bytes, FetchError> {
        let mut request = self.client.get(url);
        if priority == FetchPriority::High {
            request = request.header("priority", "u=1");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&Config {
            backend_base_url: "http://backend".to_string(),
            ..Config::default()
        })
    }

    #[test]
    fn test_storage_path_is_preferred() {
        let doc = DocumentDescriptor::new("d1", "a.pdf")
            .with_s3_path("tenant/42/a b.pdf")
            .with_url("https://cdn/a.pdf");
        assert_eq!(
            fetcher().download_url(&doc),
            "http://backend/files/download?s3_path=tenant%2F42%2Fa%20b.pdf"
        );
    }

    #[test]
    fn test_direct_url_passes_through() {
        let doc = DocumentDescriptor::new("d1", "a.pdf").with_url("https://cdn/a.pdf");
        assert_eq!(fetcher().download_url(&doc), "https://cdn/a.pdf");
    }

    #[test]
    fn test_falls_back_to_id_endpoint() {
        let doc = DocumentDescriptor::new("doc 1", "a.pdf");
        assert_eq!(
            fetcher().download_url(&doc),
            "http://backend/files/download?document_id=doc%201"
        );
    }
}
