use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPTIMIZER_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OPTIMIZER_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_OPTIMIZER_TIMEOUT_SECS: u64 = 15;

/// Application configuration loaded from environment variables.
/// Nothing is required; every value has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub optimizer: OptimizerConfig,
}

/// Settings for the external text-optimization API. Passed explicitly to the
/// client; there is no process-wide key.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Without a key every optimize call fails with `NotConfigured`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Proxy routes tried in order when the previous one fails to connect.
    /// Empty means a direct connection.
    pub proxy_urls: Vec<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPTIMIZER_BASE_URL.to_string(),
            model: DEFAULT_OPTIMIZER_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_OPTIMIZER_TIMEOUT_SECS),
            proxy_urls: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = OptimizerConfig::default();
        let timeout_secs = match optional_env("OPTIMIZER_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("OPTIMIZER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_OPTIMIZER_TIMEOUT_SECS,
        };

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            optimizer: OptimizerConfig {
                api_key: optional_env("OPTIMIZER_API_KEY"),
                base_url: optional_env("OPTIMIZER_BASE_URL").unwrap_or(defaults.base_url),
                model: optional_env("OPTIMIZER_MODEL").unwrap_or(defaults.model),
                timeout: Duration::from_secs(timeout_secs),
                proxy_urls: optional_env("OPTIMIZER_PROXY_URLS")
                    .map(|raw| parse_list(&raw))
                    .unwrap_or_default(),
            },
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
