use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String
}

impl Message {

    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {

        Message {
            role: role.into(),
            content: content.into()
        }

    }

    pub fn is_assistant(&self) -> bool {

        self.role == "assistant"

    }

}

/// Body the browser posts to `/api/chat`.
#[derive(Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub provider: Option<String>
}

impl ChatRequest {

    /// The caller's credential, if one was actually supplied.
    pub fn api_key(&self) -> Option<&str> {

        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())

    }

}

// keys must never end up in logs
impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("messages", &self.messages.len())
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("provider", &self.provider)
            .finish()
    }
}

/// Unified response shape, whichever vendor served the request.
///
/// Unknown fields are kept in `extra` so an OpenAI body can be handed back
/// to the browser as the vendor sent it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(flatten)]
    pub extra: Map<String, Value>
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(flatten)]
    pub extra: Map<String, Value>
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChoiceMessage {
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>
}

impl ChatResponse {

    /// A response carrying a single assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {

        ChatResponse {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: content.into(),
                    extra: Map::new()
                },
                extra: Map::new()
            }],
            extra: Map::new()
        }

    }

    pub fn first_content(&self) -> Option<&str> {

        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())

    }

}
