//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client works against a local
//! backend with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use stride_shared::constants::{CHAT_POLL_INTERVAL_SECS, DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash.
    /// Env: `STRIDE_API_URL`
    /// Default: `http://localhost:8080`
    pub api_url: String,

    /// Base URL that relative image paths are resolved against.
    /// Env: `STRIDE_UPLOAD_URL`
    /// Default: `{api_url}/uploads`
    pub upload_url: String,

    /// Location of the durable cache file. `None` uses the platform data
    /// directory.
    /// Env: `STRIDE_CACHE_PATH`
    pub cache_path: Option<PathBuf>,

    /// Chat history polling interval.
    /// Env: `STRIDE_CHAT_POLL_SECS`
    /// Default: 3 seconds
    pub chat_poll_interval: Duration,

    /// Per-request HTTP timeout.
    /// Env: `STRIDE_HTTP_TIMEOUT_SECS`
    /// Default: 30 seconds
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_api(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Defaults pointed at a specific backend origin.
    pub fn for_api(api_url: &str) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self {
            upload_url: format!("{api_url}/uploads"),
            api_url,
            cache_path: None,
            chat_poll_interval: Duration::from_secs(CHAT_POLL_INTERVAL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("STRIDE_API_URL") {
            Some(url) if !url.trim().is_empty() => Self::for_api(url.trim()),
            _ => Self::default(),
        };

        if let Some(url) = lookup("STRIDE_UPLOAD_URL") {
            if !url.trim().is_empty() {
                config.upload_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Some(path) = lookup("STRIDE_CACHE_PATH") {
            if !path.is_empty() {
                config.cache_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("STRIDE_CHAT_POLL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.chat_poll_interval = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid STRIDE_CHAT_POLL_SECS, using default"),
            }
        }

        if let Some(val) = lookup("STRIDE_HTTP_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid STRIDE_HTTP_TIMEOUT_SECS, using default"),
            }
        }

        config
    }
}
