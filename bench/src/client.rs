//! HTTP client for an OpenAI-compatible chat completions endpoint.
//!
//! The [`Completion`] trait decouples the pipeline from the actual transport.
//! Tests use scripted clients that return predetermined outputs without
//! touching the network. Every call performs exactly one request: retry,
//! backoff, and pacing policy belong to the caller, not here.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Output-length budget applied when the caller does not pass one.
pub const DEFAULT_MAX_TOKENS: u32 = 8_192;

/// Failure modes of a single completion call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint answered with a non-success status.
    #[error("completion request failed with status {status}: {body}")]
    RequestFailure { status: u16, body: String },
    /// The request never produced a response.
    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response arrived but its content is in no recognized shape.
    #[error("unrecognized response shape: {0}")]
    ShapeMismatch(String),
}

/// Abstraction over text-generation backends.
pub trait Completion {
    /// Request one completion. Returns the first choice's text content.
    fn complete(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, ClientError>;
}

/// Connection settings for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub api_key: String,
    /// `HTTP-Referer` attribution header, if the gateway wants one.
    pub referer: Option<String>,
    /// `X-Title` attribution header, if the gateway wants one.
    pub title: Option<String>,
    pub timeout: Duration,
}

/// Client for a hosted `/chat/completions` endpoint.
pub struct ChatClient {
    http: reqwest::blocking::Client,
    options: ClientOptions,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Value,
}

impl ChatClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            options: ClientOptions {
                base_url: options.base_url.trim_end_matches('/').to_string(),
                ..options
            },
        })
    }
}

impl Completion for ChatClient {
    fn complete(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, ClientError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let url = format!("{}/chat/completions", self.options.base_url);
        debug!(model, url = %url, max_tokens = request.max_tokens, "sending completion request");

        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(&self.options.api_key)
            .json(&request);
        if let Some(referer) = &self.options.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.options.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::RequestFailure {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|err| ClientError::ShapeMismatch(err.to_string()))?;
        let choice = parsed
            .choices
            .first()
            .ok_or_else(|| ClientError::ShapeMismatch("no choices in response".to_string()))?;
        content_text(&choice.message.content)
    }
}

/// Extract the text of a message content value.
///
/// Content is either a single string or an ordered sequence of text
/// fragments; fragments are joined with newline separators.
fn content_text(content: &Value) -> Result<String, ClientError> {
    match content {
        Value::String(text) => Ok(text.clone()),
        Value::Array(fragments) => {
            let mut parts = Vec::with_capacity(fragments.len());
            for fragment in fragments {
                match fragment {
                    Value::String(text) => parts.push(text.clone()),
                    Value::Object(map) => match map.get("text").and_then(Value::as_str) {
                        Some(text) => parts.push(text.to_string()),
                        None => {
                            return Err(ClientError::ShapeMismatch(
                                "content fragment without text field".to_string(),
                            ));
                        }
                    },
                    other => {
                        return Err(ClientError::ShapeMismatch(format!(
                            "content fragment is {other}"
                        )));
                    }
                }
            }
            Ok(parts.join("\n"))
        }
        other => Err(ClientError::ShapeMismatch(format!("content is {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_as_string_passes_through() {
        let text = content_text(&json!("hello")).expect("string content");
        assert_eq!(text, "hello");
    }

    #[test]
    fn fragment_objects_are_joined_with_newlines() {
        let value = json!([{ "type": "text", "text": "part one" }, { "text": "part two" }]);
        let text = content_text(&value).expect("fragment content");
        assert_eq!(text, "part one\npart two");
    }

    #[test]
    fn fragment_strings_are_joined_with_newlines() {
        let value = json!(["a", "b"]);
        let text = content_text(&value).expect("fragment content");
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        assert!(matches!(
            content_text(&json!(42)),
            Err(ClientError::ShapeMismatch(_))
        ));
        assert!(matches!(
            content_text(&json!([{ "type": "image" }])),
            Err(ClientError::ShapeMismatch(_))
        ));
        assert!(matches!(
            content_text(&json!([7])),
            Err(ClientError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn response_body_decodes_to_first_choice() {
        let body = json!({
            "id": "gen-1",
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        });
        let parsed: ChatResponse = serde_json::from_value(body).expect("decode response");
        let text = content_text(&parsed.choices[0].message.content).expect("content");
        assert_eq!(text, "first");
    }

    #[test]
    fn request_failure_display_carries_status_and_body() {
        let err = ClientError::RequestFailure {
            status: 429,
            body: "rate limited".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("rate limited"));
    }
}
