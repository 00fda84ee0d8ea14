//! Client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API base URL, without a trailing slash.
    pub api_url: String,
    /// Chat socket base URL, without a trailing slash.
    pub ws_url: String,
    pub request_timeout: Duration,
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Config for the given API URL with every other value defaulted.
    pub fn new(api_url: &str) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self {
            ws_url: http_to_ws(&api_url),
            api_url,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            storage_path: default_storage_path(),
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads `TEAMMATE_API_URL`, `TEAMMATE_WS_URL`, `TEAMMATE_REQUEST_TIMEOUT_MS`
    /// and `TEAMMATE_STORAGE_PATH`, falling back to defaults if not set.
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("TEAMMATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url);

        if let Some(ws_url) = non_empty_var("TEAMMATE_WS_URL") {
            config.ws_url = ws_url.trim_end_matches('/').to_string();
        }

        config.request_timeout = Duration::from_millis(
            non_empty_var("TEAMMATE_REQUEST_TIMEOUT_MS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        );

        if let Some(path) = non_empty_var("TEAMMATE_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }

        config
    }

    /// Replace the API URL and re-derive the socket URL from it.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.ws_url = http_to_ws(&self.api_url);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Convert an HTTP base URL into the matching WebSocket base URL.
pub fn http_to_ws(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        http_url.to_string()
    }
}

fn default_storage_path() -> PathBuf {
    directories::ProjectDirs::from("io", "teammate", "teammate")
        .map(|dirs| dirs.config_dir().join(STORAGE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STORAGE_FILE_NAME))
}
