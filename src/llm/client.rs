use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::llm::prompt::{SYSTEM_PROMPT, user_message};
use crate::llm::{LlmConfig, LlmError, RequestSource, error_request, strip_code_fence};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
///
/// One blocking call per question, bounded by the configured timeout and
/// never retried.
pub struct ChatClient {
    agent: ureq::Agent,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        ChatClient { agent, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Asks the model for the request JSON of `question`
    pub fn ask(&self, question: &str) -> Result<Json, LlmError> {
        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message(question),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.endpoint();
        debug!("POST {url} (model {})", self.config.model);

        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .set("Content-Type", "application/json")
            .send_json(&payload);

        let body = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| LlmError::Transport(e.to_string()))?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(LlmError::Http { status, body });
            }
            Err(ureq::Error::Transport(t)) => return Err(LlmError::Transport(t.to_string())),
        };

        let content = extract_content(&body)?;
        parse_request_json(&content)
    }
}

impl RequestSource for ChatClient {
    fn request_for(&self, question: &str) -> Json {
        match self.ask(question) {
            Ok(request) => request,
            Err(err) => {
                match &err {
                    LlmError::Http { body, .. } => error!("{err}; response body: {body}"),
                    _ => error!("{err}"),
                }
                error_request(err.to_string())
            }
        }
    }
}

/// Assistant text of the first choice of a chat-completions response body
fn extract_content(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Envelope(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::Envelope("no message content in response".into()))
}

fn parse_request_json(content: &str) -> Result<Json, LlmError> {
    let json_text = strip_code_fence(content);
    serde_json::from_str(json_text).map_err(|e| {
        debug!("unparsable model output: >>>{json_text}<<<");
        LlmError::Json(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_extract_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"operation_type\":\"error\"}"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"operation_type":"error"}"#);

        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(LlmError::Envelope(_))
        ));
        assert!(matches!(extract_content("<html>"), Err(LlmError::Envelope(_))));
    }

    #[test]
    fn test_parse_fenced_and_plain_alike() {
        let plain = r#"{"operation_type": "get_descriptive_stats", "parameters": {"column_name": "Hourly_Rate"}}"#;
        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(parse_request_json(plain).unwrap(), parse_request_json(&fenced).unwrap());
        assert!(matches!(parse_request_json("not json"), Err(LlmError::Json(_))));
    }

    #[test]
    fn test_unreachable_endpoint_becomes_error_request() {
        let client = ChatClient::new(LlmConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(2),
            ..LlmConfig::default()
        });
        let request = client.request_for("What is the average hourly rate?");
        assert_eq!(request["operation_type"], "error");
        assert!(request["message"].as_str().unwrap().contains("network error"));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = ChatClient::new(LlmConfig {
            base_url: "https://api.example.com/v1/".into(),
            ..LlmConfig::default()
        });
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
