use serde::{Deserialize, Serialize};

use crate::types::Prompt;

pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_STOP_TOKEN: &str = "###";
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// One cached completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub prompt: Prompt,
    pub engine: String,
    pub max_tokens: u32,
    pub stop_token: String,
    pub temperature: f64,
}

impl CallRequest {
    pub fn new(prompt: impl Into<Prompt>, engine: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            engine: engine.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_token: DEFAULT_STOP_TOKEN.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop_token(mut self, stop_token: impl Into<String>) -> Self {
        self.stop_token = stop_token.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// The generation parameters without the prompt.
    pub fn params(&self) -> BatchParams {
        BatchParams {
            engine: self.engine.clone(),
            max_tokens: self.max_tokens,
            stop_token: self.stop_token.clone(),
            temperature: self.temperature,
        }
    }
}

/// Generation parameters shared by every prompt of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    pub engine: String,
    pub max_tokens: u32,
    pub stop_token: String,
    pub temperature: f64,
}

impl BatchParams {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_token: DEFAULT_STOP_TOKEN.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop_token(mut self, stop_token: impl Into<String>) -> Self {
        self.stop_token = stop_token.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}
