//! Model service configuration from environment variables.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Where the model service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    /// Never contact a service; answer everything offline.
    pub disabled: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            disabled: false,
        }
    }
}

impl ModelConfig {
    /// Offline-only configuration.
    pub fn offline() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Create from environment variables.
    ///
    /// - `BEAR_MODEL_HOST`: service host (default `127.0.0.1`)
    /// - `BEAR_MODEL_PORT`: service port (default `7878`)
    /// - `BEAR_MODEL_TIMEOUT_MS`: per-request timeout (default `20000`)
    /// - `BEAR_MODEL_DISABLED`: `1` or `true` answers everything offline
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ModelConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("BEAR_MODEL_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("BEAR_MODEL_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let timeout_ms = lookup("BEAR_MODEL_TIMEOUT_MS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let disabled = lookup("BEAR_MODEL_DISABLED")
            .map(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            host,
            port,
            timeout: Duration::from_millis(timeout_ms.max(1)),
            disabled,
        }
    }

    /// `host:port`, for logs.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
