use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::record::DEFAULT_STALE_AFTER;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scoring_api_url: String,
    pub extraction_debounce: Duration,
    pub url_poll_interval: Duration,
    pub launcher_debounce: Duration,
    /// Records older than this are reported as inactive.
    pub stale_after: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scoring_api_url: std::env::var("SCORING_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            extraction_debounce: Duration::from_millis(parse_env("EXTRACTION_DEBOUNCE_MS", 500)?),
            url_poll_interval: Duration::from_millis(parse_env("URL_POLL_INTERVAL_MS", 1000)?),
            launcher_debounce: Duration::from_millis(parse_env("LAUNCHER_DEBOUNCE_MS", 300)?),
            stale_after: Duration::from_secs(parse_env(
                "STALE_AFTER_SECS",
                DEFAULT_STALE_AFTER.as_secs(),
            )?),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
