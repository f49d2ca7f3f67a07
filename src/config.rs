//! Runtime configuration.
//!
//! Everything is read from the process environment once at startup:
//!
//! - `ORDERIT_API_URL`: base URL of the order-management API, including its
//!   `/api` prefix. Defaults to the development backend.
//! - `ORDERIT_LOG_DIR`: overrides where rolling log files are written.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:32780/api";

const ENV_API_URL: &str = "ORDERIT_API_URL";
const ENV_LOG_DIR: &str = "ORDERIT_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_dir: None,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        let api_url = std::env::var(ENV_API_URL)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| normalize_api_url(&v))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let log_dir = std::env::var(ENV_LOG_DIR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self { api_url, log_dir }
    }
}

/// Normalise the API base URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_api_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn normalize_adds_scheme_and_strips_slashes() {
        assert_eq!(
            normalize_api_url("localhost:32780/api/"),
            "http://localhost:32780/api"
        );
        assert_eq!(
            normalize_api_url("orders.example.com/api"),
            "https://orders.example.com/api"
        );
        assert_eq!(
            normalize_api_url(" https://orders.example.com/api// "),
            "https://orders.example.com/api"
        );
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults_when_unset() {
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_LOG_DIR);
        assert_eq!(ConsoleConfig::from_env(), ConsoleConfig::default());
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        std::env::set_var(ENV_API_URL, "127.0.0.1:9000/api/");
        std::env::set_var(ENV_LOG_DIR, "/tmp/orderit-logs");
        let config = ConsoleConfig::from_env();
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_LOG_DIR);

        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/orderit-logs")));
    }

    #[test]
    #[serial]
    fn blank_env_values_fall_back() {
        std::env::set_var(ENV_API_URL, "   ");
        let config = ConsoleConfig::from_env();
        std::env::remove_var(ENV_API_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
