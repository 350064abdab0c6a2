//! Client for the Anthropic Messages API.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::BridgeConfig;

/// API version sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Failures talking to the completion service.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API communication failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("API key is not a valid header value: {0}")]
    InvalidApiKey(#[from] InvalidHeaderValue),
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A model advertised by the `/v1/models` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

/// Long-lived handle to the completion API. Built once at startup and shared.
pub struct CompletionClient {
    client: Client,
    messages_url: String,
    models_url: String,
    default_model: String,
    max_tokens: u32,
}

impl CompletionClient {
    /// Builds the HTTP client with the API key, version header and request
    /// timeout taken from `config`.
    pub fn new(config: &BridgeConfig) -> CompletionResult<Self> {
        debug!("Creating new CompletionClient instance");

        let mut api_key = HeaderValue::from_str(&config.anthropic_api_key)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            messages_url: config.endpoint("v1/messages"),
            models_url: config.endpoint("v1/models"),
            default_model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends `prompt` as a single user turn and returns the reply text.
    ///
    /// `model` overrides the configured default model for this request.
    pub async fn complete(&self, prompt: &str, model: Option<&str>) -> CompletionResult<String> {
        let model = model.unwrap_or(&self.default_model);
        info!("Sending completion request to model '{}'", model);

        let body = MessagesRequest {
            model,
            max_tokens: self.max_tokens,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self.client.post(&self.messages_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = api_error(status, &text);
            error!("Completion request to '{}' failed: {}", model, err);
            return Err(err);
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)?;
        let reply = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } if !text.trim().is_empty() => Some(text),
                _ => None,
            })
            .ok_or(CompletionError::EmptyResponse)?;

        debug!("Received {} characters from '{}'", reply.chars().count(), model);
        Ok(reply)
    }

    /// Lists the models available to the configured API key.
    pub async fn list_models(&self) -> CompletionResult<Vec<ModelInfo>> {
        info!("Fetching list of available models");

        let response = self
            .client
            .get(&self.models_url)
            .query(&[("limit", "100")])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = api_error(status, &text);
            error!("Failed to fetch models: {}", err);
            return Err(err);
        }

        let list: ModelList = serde_json::from_str(&text)?;
        debug!("Successfully retrieved {} models", list.data.len());
        Ok(list.data)
    }
}

/// Maps a non-success response to [`CompletionError::Api`], preferring the
/// message from the API's error body.
fn api_error(status: StatusCode, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| match body.trim() {
            "" => status.canonical_reason().unwrap_or("unknown error").to_string(),
            raw => raw.to_string(),
        });

    CompletionError::Api { status, message }
}
