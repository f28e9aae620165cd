//! Cache key and cached value.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};

use crate::types::Prompt;

/// Which [`Prompt`] variant a key's canonical text came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    #[default]
    Text,
    Chat,
}

/// Fingerprint of a generation request.
///
/// Compared and hashed by value. The prompt is stored in canonical form, so two requests that
/// differ only in leading whitespace map to the same key. The prompt kind is part of the key:
/// a text prompt never matches a conversation, even when its text is that conversation's JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheKey {
    engine: String,
    #[serde(default)]
    prompt_kind: PromptKind,
    prompt: String,
    stop_token: String,
    temperature: f64,
    max_tokens: u32,
}

impl CacheKey {
    pub fn new(
        engine: impl Into<String>,
        prompt: &Prompt,
        stop_token: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            engine: engine.into(),
            prompt_kind: match prompt {
                Prompt::Text(_) => PromptKind::Text,
                Prompt::Conversation(_) => PromptKind::Chat,
            },
            prompt: prompt.canonical(),
            stop_token: stop_token.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn prompt_kind(&self) -> PromptKind {
        self.prompt_kind
    }

    /// Canonical prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn stop_token(&self) -> &str {
        &self.stop_token
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Hex SHA-256 of the key's JSON form. Short enough to log; stable across runs.
    pub fn fingerprint(&self) -> String {
        let canonical =
            serde_json::to_string(self).expect("string and number fields always serialize");
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    // -0.0 and 0.0 are the same temperature.
    fn temperature_bits(&self) -> u64 {
        if self.temperature == 0.0 {
            0.0f64.to_bits()
        } else {
            self.temperature.to_bits()
        }
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.engine == other.engine
            && self.prompt_kind == other.prompt_kind
            && self.prompt == other.prompt
            && self.stop_token == other.stop_token
            && self.temperature_bits() == other.temperature_bits()
            && self.max_tokens == other.max_tokens
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.engine.hash(state);
        self.prompt_kind.hash(state);
        self.prompt.hash(state);
        self.stop_token.hash(state);
        self.temperature_bits().hash(state);
        self.max_tokens.hash(state);
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.engine, &self.fingerprint()[..12])
    }
}

/// What a cache hit returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheValue {
    pub first_response: String,
}

impl CacheValue {
    pub fn new(first_response: impl Into<String>) -> Self {
        Self {
            first_response: first_response.into(),
        }
    }
}
