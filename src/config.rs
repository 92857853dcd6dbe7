//! Pipeline configuration
//!
//! Loaded from environment variables with sensible defaults, following
//! the convention of the surrounding application. The library never reads
//! the environment on its own; the composition root calls
//! [`Config::from_env`] once and passes the result down.

/// Configuration for the preview pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend HTTP API (no trailing slash)
    pub backend_base_url: String,

    /// Session token attached as a bearer credential to backend requests
    pub session_token: Option<String>,

    /// Capacity of the full-resource handle cache
    pub resource_cache_capacity: usize,

    /// Capacity of the cover cache
    pub cover_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_string(),
            session_token: None,
            resource_cache_capacity: crate::cache::MAX_RESOURCE_CACHE,
            cover_cache_capacity: crate::cache::MAX_COVER_CACHE,
        }
    }
}

impl Config {
    /// Build configuration from `DOCPREVIEW_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_base_url: std::env::var("DOCPREVIEW_BACKEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_base_url),
            session_token: std::env::var("DOCPREVIEW_SESSION_TOKEN").ok(),
            resource_cache_capacity: env_usize(
                "DOCPREVIEW_RESOURCE_CACHE_CAPACITY",
                defaults.resource_cache_capacity,
            ),
            cover_cache_capacity: env_usize(
                "DOCPREVIEW_COVER_CACHE_CAPACITY",
                defaults.cover_cache_capacity,
            ),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_reasonable() {
        let config = Config::default();
        assert_eq!(config.resource_cache_capacity, 50);
        assert!(config.session_token.is_none());
        assert!(!config.backend_base_url.ends_with('/'));
    }
}
