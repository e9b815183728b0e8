use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Fails at startup if the service URL is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: require_env("SCREENER_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            request_timeout: secs_env("SCREENER_REQUEST_TIMEOUT_SECS", 30)?,
            upload_timeout: secs_env("SCREENER_UPLOAD_TIMEOUT_SECS", 120)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn secs_env(key: &str, default: u64) -> Result<Duration> {
    let secs = match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds"))?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}
