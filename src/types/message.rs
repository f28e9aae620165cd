//! Chat messages and the prompt union accepted by the wrapper.

use serde::{Deserialize, Serialize};

/// A single chat turn, serialized in the OpenAI `{"role", "content"}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// What the caller wants completed: a bare text prompt or a whole conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Conversation(Vec<Message>),
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Prompt::Text(text.into())
    }

    pub fn conversation(messages: Vec<Message>) -> Self {
        Prompt::Conversation(messages)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Prompt::Text(t) => t.is_empty(),
            Prompt::Conversation(m) => m.is_empty(),
        }
    }

    /// Deterministic string form used for cache keys.
    ///
    /// Leading whitespace never distinguishes two prompts. Conversations are rendered as
    /// compact JSON so role boundaries survive and field order is fixed by the type.
    pub fn canonical(&self) -> String {
        match self {
            Prompt::Text(t) => t.trim_start().to_string(),
            Prompt::Conversation(messages) => serde_json::to_string(messages)
                .expect("role/content messages always serialize"),
        }
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::Text(s.to_string())
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::Text(s)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt::Conversation(messages)
    }
}
