use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::search_client::SearchOptions;

const DEFAULT_COMPLETION_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_SEARCH_API_URL: &str = "https://serpapi.com/search";

/// Application configuration loaded from environment variables.
/// Startup fails if the provider credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub completion_api_url: String,
    pub completion_model: String,
    pub serp_api_key: String,
    pub search_api_url: String,
    pub search_options: SearchOptions,
    /// Ceiling applied to every outbound call (completion and search).
    pub upstream_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let search_options = SearchOptions {
            location: env_or("SEARCH_LOCATION", "United States"),
            language: env_or("SEARCH_LANGUAGE", "en"),
            country: env_or("SEARCH_COUNTRY", "us"),
            result_count: parse_result_count(&env_or("SEARCH_RESULT_COUNT", "5"))?,
        };

        let timeout_secs = env_or("UPSTREAM_TIMEOUT_SECS", "120")
            .parse::<u64>()
            .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            completion_api_url: env_or("COMPLETION_API_URL", DEFAULT_COMPLETION_API_URL),
            completion_model: env_or("COMPLETION_MODEL", DEFAULT_COMPLETION_MODEL),
            serp_api_key: require_env("SERP_API_KEY")?,
            search_api_url: env_or("SEARCH_API_URL", DEFAULT_SEARCH_API_URL),
            search_options,
            upstream_timeout: Duration::from_secs(timeout_secs),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_result_count(raw: &str) -> Result<u32> {
    let count = raw
        .trim()
        .parse::<u32>()
        .context("SEARCH_RESULT_COUNT must be a positive integer")?;
    ensure!(count > 0, "SEARCH_RESULT_COUNT must be a positive integer, got 0");
    Ok(count)
}
