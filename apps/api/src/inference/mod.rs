//! Inference client, the single point of entry for hosted model calls.
//!
//! Wraps the Hugging Face inference endpoints. A cold model answers with a
//! body containing "is currently loading" and an `estimated_time`; the client
//! waits that long and resubmits, up to `max_retries` times.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::models::Category;

pub mod sleeper;

pub use sleeper::{Sleeper, TokioSleeper};

const LOADING_MARKER: &str = "is currently loading";
const DEFAULT_LOADING_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model is still loading after {retries} retries")]
    ModelLoading { retries: u32 },

    #[error("Invalid response from inference API: {body}")]
    MalformedResponse { body: String },

    #[error("Inference API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("No category returned")]
    NoLabels,

    #[error("Model returned a label outside the candidate set: {0}")]
    UnexpectedLabel(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Zero-shot classification output. Labels are ordered by descending score.
#[derive(Debug, Deserialize)]
pub struct ZeroShotResponse {
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_key: String,
    categorize_url: String,
    sentiment_url: String,
    max_retries: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl InferenceClient {
    pub fn new(config: &Config) -> Result<Self, InferenceError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: config.hf_api_key.clone(),
            categorize_url: config.categorize_url.clone(),
            sentiment_url: config.sentiment_url.clone(),
            max_retries: config.max_retries,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Posts `body` to `url`, waiting out cold starts.
    ///
    /// The loading condition is only visible in the body, not as a status code.
    async fn post_with_warmup<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, InferenceError> {
        let mut attempt: u32 = 0;

        loop {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            let parsed = serde_json::from_str::<Value>(&text);
            if is_loading(&parsed, &text) {
                if attempt >= self.max_retries {
                    return Err(InferenceError::ModelLoading { retries: attempt });
                }
                let wait = estimated_wait(&text);
                warn!(
                    "Model at {} is loading (attempt {}), retrying after {}ms...",
                    url,
                    attempt + 1,
                    wait.as_millis()
                );
                self.sleeper.sleep(wait).await;
                attempt += 1;
                continue;
            }

            let data = parsed.map_err(|_| {
                error!("Failed to parse inference response: {text}");
                InferenceError::MalformedResponse { body: text.clone() }
            })?;

            if !status.is_success() {
                return Err(upstream_error(status, &data));
            }

            debug!("Inference call to {} succeeded after {} retries", url, attempt);
            return Ok(data);
        }
    }

    /// Raw zero-shot classification of `text` against the note categories.
    pub async fn classify(&self, text: &str) -> Result<Value, InferenceError> {
        let labels = Category::labels();
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
            },
        };
        self.post_with_warmup(&self.categorize_url, &request).await
    }

    /// Picks the highest-confidence category for `text`.
    pub async fn categorize(&self, text: &str) -> Result<Category, InferenceError> {
        let data = self.classify(text).await?;
        let parsed: ZeroShotResponse =
            serde_json::from_value(data).map_err(|_| InferenceError::NoLabels)?;

        let top = parsed
            .labels
            .into_iter()
            .next()
            .ok_or(InferenceError::NoLabels)?;

        top.parse::<Category>()
            .map_err(|e| InferenceError::UnexpectedLabel(e.0))
    }

    /// Raw sentiment classification of `text`.
    pub async fn sentiment(&self, text: &str) -> Result<Value, InferenceError> {
        self.post_with_warmup(&self.sentiment_url, &json!({ "inputs": text }))
            .await
    }
}

/// A cold model reports itself in the `error` field. Successful bodies echo
/// the input text back, so only unparseable bodies are searched whole.
fn is_loading(parsed: &Result<Value, serde_json::Error>, text: &str) -> bool {
    match parsed {
        Ok(data) => data
            .get("error")
            .is_some_and(|e| error_message(e).contains(LOADING_MARKER)),
        Err(_) => text.contains(LOADING_MARKER),
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

fn upstream_error(status: StatusCode, data: &Value) -> InferenceError {
    let message = match data.get("error") {
        None | Some(Value::Null) => "AI service error".to_string(),
        Some(error) => error_message(error),
    };
    InferenceError::Upstream {
        status: status.as_u16(),
        message,
    }
}

/// Reads `"estimated_time": <seconds>` out of a loading body, falling back to 10s.
fn estimated_wait(body: &str) -> Duration {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r#""estimated_time"\s*:\s*(\d+(?:\.\d+)?)"#).expect("valid regex literal")
    });

    pattern
        .captures(body)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(DEFAULT_LOADING_WAIT)
}
