//! Environment configuration for both binaries

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REVEAL_MS: u64 = 30;

/// Proxy server settings
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Provider credential; never leaves the proxy process
    pub api_key: Option<String>,
    pub model: String,
    pub upstream_url: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("MUSE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            upstream_url: lookup("MUSE_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            port: lookup("MUSE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

/// Terminal client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_url: String,
    pub db_path: PathBuf,
    pub reveal_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("MUSE_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".muse").join("muse.db")
            },
            PathBuf::from,
        );

        let reveal_ms = lookup("MUSE_REVEAL_MS")
            .and_then(|ms| ms.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_REVEAL_MS);

        Self {
            proxy_url: lookup("MUSE_PROXY_URL").unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()),
            db_path,
            reveal_interval: Duration::from_millis(reveal_ms),
        }
    }

    /// Log file, kept next to the database so the terminal stays clean
    pub fn log_path(&self) -> PathBuf {
        self.db_path.with_file_name("muse-chat.log")
    }
}
