use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external résumé backend, e.g. `https://api.example.com/v1`.
    pub backend_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub resume_cache_ttl: Duration,
    pub bullet_debounce: Duration,
    pub backend_timeout: Duration,
    /// Edit sessions untouched for this long are evicted.
    pub edit_session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_api_url: require_env("BACKEND_API_URL")?,
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            resume_cache_ttl: Duration::from_secs(parse_env("RESUME_CACHE_TTL_SECS", 300)?),
            bullet_debounce: Duration::from_millis(parse_env("BULLET_DEBOUNCE_MS", 300)?),
            backend_timeout: Duration::from_secs(parse_env("BACKEND_TIMEOUT_SECS", 60)?),
            edit_session_ttl: Duration::from_secs(parse_env("EDIT_SESSION_TTL_SECS", 1800)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
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
