//! The request source: turns a free-form question into request JSON with a
//! chat-completions call.

use std::time::Duration;

use serde_json::{Value as Json, json};
use thiserror::Error;

pub mod client;
pub mod prompt;

pub use client::ChatClient;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model API returned HTTP {status}")]
    Http { status: u16, body: String },

    #[error("network error while calling the language model API: {0}")]
    Transport(String),

    #[error("unexpected response format from the language model: {0}")]
    Envelope(String),

    #[error("language model returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces a request for a question. Never fails: problems come back as an
/// `error` request carrying the reason.
pub trait RequestSource {
    fn request_for(&self, question: &str) -> Json;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
        }
    }
}

pub fn error_request(message: impl Into<String>) -> Json {
    json!({ "operation_type": "error", "message": message.into() })
}

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````)
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
