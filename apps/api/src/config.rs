use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_CATEGORIZE_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";
pub const DEFAULT_SENTIMENT_URL: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory note store.
    pub database_url: Option<String>,
    pub hf_api_key: String,
    pub categorize_url: String,
    pub sentiment_url: String,
    pub max_retries: u32,
    pub minimum_keyword_length: usize,
    pub search_debounce: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            hf_api_key: require("HF_API_KEY")?,
            categorize_url: lookup("HF_CATEGORIZE_URL")
                .unwrap_or_else(|| DEFAULT_CATEGORIZE_URL.to_string()),
            sentiment_url: lookup("HF_SENTIMENT_URL")
                .unwrap_or_else(|| DEFAULT_SENTIMENT_URL.to_string()),
            max_retries: parse_or(&lookup, "MAX_RETRIES", 3)?,
            minimum_keyword_length: parse_or(&lookup, "MINIMUM_KEYWORD_LENGTH", 3)?,
            search_debounce: Duration::from_millis(parse_or(&lookup, "SEARCH_DEBOUNCE_MS", 500)?),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
