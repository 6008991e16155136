//! Vendor dispatch: how each provider's request is built and its reply read.
//!
//! Both builders and parsers are pure, so the wire shapes can be checked
//! without a network.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::models::{ChatResponse, Message};
use crate::persona::SYSTEM_PROMPT;

pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const CLAUDE_MODEL: &str = "claude-3-sonnet-20240229";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Claude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProvider;

impl FromStr for Provider {
    type Err = InvalidProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "claude" => Ok(Provider::Claude),
            _ => Err(InvalidProvider),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct OpenAiRequest<'a> {
    pub model: &'static str,
    pub messages: Vec<OpenAiMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct OpenAiMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ClaudeRequest<'a> {
    pub model: &'static str,
    pub system: &'static str,
    pub messages: Vec<ClaudeMessage<'a>>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ClaudeMessage<'a> {
    pub role: ClaudeRole,
    pub content: &'a str,
}

/// Anthropic only accepts these two roles in `messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaudeRole {
    User,
    Assistant,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Outbound body, already in the chosen vendor's schema.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpstreamRequest<'a> {
    OpenAi(OpenAiRequest<'a>),
    Claude(ClaudeRequest<'a>),
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
        }
    }

    pub fn endpoint(self, upstream: &UpstreamConfig) -> String {
        match self {
            Provider::OpenAi => format!("{}/v1/chat/completions", upstream.openai_base_url),
            Provider::Claude => format!("{}/v1/messages", upstream.anthropic_base_url),
        }
    }

    /// Attach the vendor's credential headers.
    pub fn authorize(self, builder: RequestBuilder, api_key: &str) -> RequestBuilder {
        match self {
            Provider::OpenAi => builder.header("Authorization", format!("Bearer {}", api_key)),
            Provider::Claude => builder
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        }
    }

    pub fn build_request(self, messages: &[Message]) -> UpstreamRequest<'_> {
        match self {
            Provider::OpenAi => {
                let mut outbound = Vec::with_capacity(messages.len() + 1);
                outbound.push(OpenAiMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                });
                outbound.extend(messages.iter().map(|message| OpenAiMessage {
                    role: &message.role,
                    content: &message.content,
                }));

                UpstreamRequest::OpenAi(OpenAiRequest {
                    model: OPENAI_MODEL,
                    messages: outbound,
                    temperature: TEMPERATURE,
                    max_tokens: MAX_TOKENS,
                })
            }
            Provider::Claude => UpstreamRequest::Claude(ClaudeRequest {
                model: CLAUDE_MODEL,
                system: SYSTEM_PROMPT,
                messages: messages
                    .iter()
                    .map(|message| ClaudeMessage {
                        role: if message.is_assistant() {
                            ClaudeRole::Assistant
                        } else {
                            ClaudeRole::User
                        },
                        content: &message.content,
                    })
                    .collect(),
                max_tokens: MAX_TOKENS,
            }),
        }
    }

    /// Turn a successful vendor body into the unified response.
    pub fn parse_response(self, body: &[u8]) -> Result<ChatResponse, GatewayError> {
        let malformed = |reason: String| GatewayError::MalformedResponse {
            provider: self,
            reason,
        };

        match self {
            Provider::OpenAi => {
                let response: ChatResponse =
                    serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
                if response.choices.is_empty() {
                    return Err(malformed("no choices returned".to_string()));
                }
                Ok(response)
            }
            Provider::Claude => {
                let response: ClaudeResponse =
                    serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
                let text = response
                    .content
                    .into_iter()
                    .filter(|block| block.kind.as_deref().is_none_or(|kind| kind == "text"))
                    .find_map(|block| block.text)
                    .ok_or_else(|| malformed("no text content block".to_string()))?;
                Ok(ChatResponse::assistant(text))
            }
        }
    }

    /// Turn a non-success vendor reply into an error, keeping the vendor's
    /// own message when it sent one.
    pub fn upstream_error(self, status: StatusCode, body: &[u8]) -> GatewayError {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("{} API error", self.display_name()));

        GatewayError::Upstream {
            provider: self,
            status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversation() -> Vec<Message> {
        vec![
            Message::new("user", "I feel anxious"),
            Message::new("assistant", "That sounds hard. What's on your mind?"),
            Message::new("system", "stray system note"),
            Message::new("user", "Work, mostly."),
        ]
    }

    #[test]
    fn parses_known_providers_only() {
        assert_eq!("openai".parse::<Provider>(), Ok(Provider::OpenAi));
        assert_eq!("claude".parse::<Provider>(), Ok(Provider::Claude));
        assert_eq!("gemini".parse::<Provider>(), Err(InvalidProvider));
        assert_eq!("OpenAI".parse::<Provider>(), Err(InvalidProvider));
    }

    #[test]
    fn openai_request_leads_with_one_system_message() {
        let messages = conversation();
        let payload = serde_json::to_value(Provider::OpenAi.build_request(&messages)).unwrap();

        assert_eq!(payload["model"], OPENAI_MODEL);
        assert_eq!(payload["temperature"], json!(0.7f32));
        assert_eq!(payload["max_tokens"], MAX_TOKENS);

        let outbound = payload["messages"].as_array().unwrap();
        assert_eq!(outbound.len(), messages.len() + 1);
        assert_eq!(outbound[0], json!({"role": "system", "content": SYSTEM_PROMPT}));

        // caller roles and order survive untouched
        for (sent, original) in outbound[1..].iter().zip(&messages) {
            assert_eq!(sent["role"], original.role.as_str());
            assert_eq!(sent["content"], original.content.as_str());
        }
        assert!(payload.get("system").is_none());
    }

    #[test]
    fn claude_request_hoists_prompt_and_coerces_roles() {
        let messages = conversation();
        let payload = serde_json::to_value(Provider::Claude.build_request(&messages)).unwrap();

        assert_eq!(payload["model"], CLAUDE_MODEL);
        assert_eq!(payload["system"], SYSTEM_PROMPT);
        assert_eq!(payload["max_tokens"], MAX_TOKENS);
        assert!(payload.get("temperature").is_none());

        let roles: Vec<&str> = payload["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["user", "assistant", "user", "user"]);
        assert_eq!(payload["messages"][2]["content"], "stray system note");
    }

    #[test]
    fn claude_request_with_empty_history() {
        let payload = serde_json::to_value(Provider::Claude.build_request(&[])).unwrap();
        assert_eq!(payload["messages"], json!([]));
        assert_eq!(payload["system"], SYSTEM_PROMPT);
    }

    #[test]
    fn openai_response_passes_through() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "I hear you."}}]
        });
        let parsed = Provider::OpenAi
            .parse_response(body.to_string().as_bytes())
            .unwrap();

        assert_eq!(parsed.first_content(), Some("I hear you."));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), body);
    }

    #[test]
    fn openai_response_without_choices_is_malformed() {
        let err = Provider::OpenAi
            .parse_response(br#"{"choices": []}"#)
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));

        let err = Provider::OpenAi.parse_response(b"not json").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
    }

    #[test]
    fn claude_response_takes_first_text_block() {
        let body = json!({
            "id": "msg_1",
            "type": "message",
            "content": [
                {"type": "text", "text": "Let's take a breath together."},
                {"type": "text", "text": "second block"}
            ],
            "stop_reason": "end_turn"
        });
        let parsed = Provider::Claude
            .parse_response(body.to_string().as_bytes())
            .unwrap();

        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({"choices": [{"message": {"content": "Let's take a breath together."}}]})
        );
    }

    #[test]
    fn claude_response_skips_non_text_blocks() {
        let body = json!({
            "content": [
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": "Here for you."}
            ]
        });
        let parsed = Provider::Claude
            .parse_response(body.to_string().as_bytes())
            .unwrap();
        assert_eq!(parsed.first_content(), Some("Here for you."));

        let err = Provider::Claude
            .parse_response(br#"{"content": []}"#)
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
    }

    #[test]
    fn upstream_error_prefers_vendor_message() {
        let body = json!({"error": {"type": "invalid_request_error", "message": "Incorrect API key provided"}});
        let err = Provider::OpenAi.upstream_error(StatusCode::UNAUTHORIZED, body.to_string().as_bytes());
        match err {
            GatewayError::Upstream { status, message, .. } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Provider::Claude.upstream_error(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        match err {
            GatewayError::Upstream { message, .. } => assert_eq!(message, "Claude API error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn endpoints_follow_configured_base_urls() {
        let upstream = UpstreamConfig {
            openai_base_url: "http://127.0.0.1:9000".to_string(),
            anthropic_base_url: "http://127.0.0.1:9001".to_string(),
            timeout: std::time::Duration::from_secs(5),
        };

        assert_eq!(
            Provider::OpenAi.endpoint(&upstream),
            "http://127.0.0.1:9000/v1/chat/completions"
        );
        assert_eq!(
            Provider::Claude.endpoint(&upstream),
            "http://127.0.0.1:9001/v1/messages"
        );
    }
}
