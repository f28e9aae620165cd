//! The generation service contract.
//!
//! The wrapper only ever talks to a [`GenerationClient`]. [`crate::transport::HttpTransport`]
//! is the OpenAI-compatible implementation; tests substitute their own.

pub mod config;

pub use config::ClientConfig;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{Message, RawResponse};
use crate::Result;

/// Engine identifier of the legacy, non-chat completion endpoint.
pub const LEGACY_ENGINE: &str = "gpt-3";

/// Every engine except the legacy one speaks the chat protocol.
pub fn is_chat_engine(engine: &str) -> bool {
    !engine.trim().eq_ignore_ascii_case(LEGACY_ENGINE)
}

/// What is sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One conversation, for chat engines.
    Chat(Vec<Message>),
    /// Independent prompts completed in one request, for the legacy endpoint.
    Completion(Vec<String>),
}

impl Payload {
    pub fn is_chat(&self) -> bool {
        matches!(self, Payload::Chat(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub engine: String,
    pub payload: Payload,
    pub max_tokens: u32,
    pub stop_token: String,
    pub temperature: f64,
    /// Completions per prompt.
    pub n: u32,
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one completion request.
    ///
    /// Throttling must surface as [`ProviderErrorKind::RateLimited`] so the retry policy can
    /// recognize it.
    ///
    /// [`ProviderErrorKind::RateLimited`]: crate::error_code::ProviderErrorKind::RateLimited
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse>;

    fn name(&self) -> &'static str {
        "generation"
    }
}

#[async_trait]
impl<C: GenerationClient + ?Sized> GenerationClient for Arc<C> {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse> {
        (**self).generate(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[async_trait]
impl<C: GenerationClient + ?Sized> GenerationClient for Box<C> {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse> {
        (**self).generate(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
