//! Raw completion responses, deserialized straight from the OpenAI wire format.
//!
//! Both endpoints share the same envelope: a `usage` block and a list of `choices`. Chat
//! choices carry `message.content`; legacy completion choices carry `text`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,
}

impl Choice {
    pub fn chat(content: impl Into<String>) -> Self {
        Self {
            index: None,
            text: None,
            message: Some(ChoiceMessage {
                content: Some(content.into()),
            }),
        }
    }

    pub fn completion(text: impl Into<String>) -> Self {
        Self {
            index: None,
            text: Some(text.into()),
            message: None,
        }
    }

    /// The generated text, read from the field the endpoint fills.
    pub fn content(&self, chat: bool) -> Option<&str> {
        if chat {
            self.message.as_ref().and_then(|m| m.content.as_deref())
        } else {
            self.text.as_deref()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl RawResponse {
    pub fn new(choices: Vec<Choice>, usage: Usage) -> Self {
        Self { usage, choices }
    }

    /// Text of the first choice.
    pub fn first_text(&self, chat: bool) -> Result<String> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| Error::malformed("response contains no choices"))?;
        choice
            .content(chat)
            .map(str::to_string)
            .ok_or_else(|| Error::malformed(missing_field(chat, 0)))
    }

    /// Text of every choice, in the order the provider returned them.
    pub fn all_texts(&self, chat: bool) -> Result<Vec<String>> {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.content(chat)
                    .map(str::to_string)
                    .ok_or_else(|| Error::malformed(missing_field(chat, i)))
            })
            .collect()
    }
}

fn missing_field(chat: bool, i: usize) -> String {
    if chat {
        format!("choices[{}].message.content is missing", i)
    } else {
        format!("choices[{}].text is missing", i)
    }
}
