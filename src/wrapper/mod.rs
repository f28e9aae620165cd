//! # Wrapper Module
//!
//! The caching, retrying, cost-reporting front door to a generation service.
//!
//! A call first looks its [`CacheKey`] up in the [`CacheStore`]. Hits return the stored text at
//! zero cost without touching the network. Misses go through the [`RetryPolicy`] to the
//! [`GenerationClient`], are priced, stored, and returned.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Wrapper`] | Single and batch entry points |
//! | [`WrapperBuilder`] | Cache location, flush interval, retry policy, client, pricing |
//! | [`CallRequest`] | One prompt with its generation parameters |
//! | [`BatchParams`] | Generation parameters shared by a batch |
//!
//! ## Example
//!
//! ```rust,no_run
//! use gptinference::cost::InMemoryCostSink;
//! use gptinference::wrapper::{CallRequest, Wrapper};
//!
//! #[tokio::main]
//! async fn main() -> gptinference::Result<()> {
//!     let wrapper = Wrapper::builder().cache_path("cache.jsonl").build()?;
//!     let costs = InMemoryCostSink::new();
//!     let answer = wrapper
//!         .call(&CallRequest::new("Tell me a joke.", "gpt-4o"), &costs)
//!         .await?;
//!     println!("{} (${:.4})", answer, costs.total_dollars());
//!     Ok(())
//! }
//! ```
//!
//! [`RetryPolicy`]: crate::resilience::RetryPolicy

mod batch;
mod builder;
mod request;

pub use builder::WrapperBuilder;
pub use request::{
    BatchParams, CallRequest, DEFAULT_MAX_TOKENS, DEFAULT_STOP_TOKEN, DEFAULT_TEMPERATURE,
};

use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, CacheStore, CacheValue};
use crate::client::{is_chat_engine, GenerationClient, GenerationRequest, Payload};
use crate::cost::{CallCost, CostSink};
use crate::resilience::RetryingClient;
use crate::tokens::PricingTable;
use crate::types::{Message, Prompt, Usage};
use crate::{Error, ErrorContext, Result};

/// Cached access to a generation service.
///
/// `Send + Sync`; share it behind an `Arc` to use it from several tasks.
pub struct Wrapper {
    store: Arc<CacheStore>,
    client: RetryingClient<Arc<dyn GenerationClient>>,
    pricing: PricingTable,
}

impl Wrapper {
    pub fn builder() -> WrapperBuilder {
        WrapperBuilder::new()
    }

    /// Complete one prompt, from the cache when possible.
    ///
    /// An empty prompt returns `""` immediately and reports nothing. Otherwise exactly one
    /// [`CallCost`] is reported: zero on a hit, the priced usage on a miss. A failed miss leaves
    /// the cache unchanged.
    pub async fn call(&self, request: &CallRequest, sink: &dyn CostSink) -> Result<String> {
        if request.prompt.is_empty() {
            return Ok(String::new());
        }
        validate_engine(&request.engine)?;

        let key = self.cache_key(&request.prompt, &request.params());
        if let Some(hit) = self.store.get(&key) {
            debug!(key = %key, "cache hit");
            sink.report(CallCost::free(&request.engine));
            return Ok(hit.first_response);
        }
        debug!(key = %key, engine = %request.engine, "cache miss");

        let chat = is_chat_engine(&request.engine);
        let generation = GenerationRequest {
            engine: request.engine.clone(),
            payload: single_payload(&request.prompt, chat)?,
            max_tokens: request.max_tokens,
            stop_token: request.stop_token.clone(),
            temperature: request.temperature,
            n: 1,
        };
        let response = self.client.generate(&generation).await?;
        let text = response.first_text(chat)?;
        let cost = self.price(&request.engine, &response.usage)?;

        let stored = self.store.set(key, CacheValue::new(text));
        sink.report(cost);
        Ok(stored.first_response)
    }

    /// The key a prompt is cached under with the given parameters.
    pub fn cache_key(&self, prompt: &Prompt, params: &BatchParams) -> CacheKey {
        CacheKey::new(
            &params.engine,
            prompt,
            &params.stop_token,
            params.temperature,
            params.max_tokens,
        )
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Write pending cache entries now instead of waiting for the flush interval.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    fn price(&self, engine: &str, usage: &Usage) -> Result<CallCost> {
        let dollars = self
            .pricing
            .cost(engine, usage.prompt_tokens, usage.completion_tokens)?;
        Ok(CallCost {
            engine: engine.to_string(),
            dollar_cost: dollars,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            cache_hit: false,
        })
    }
}

impl std::fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrapper")
            .field("store", &self.store)
            .field("client", &self.client.name())
            .field("policy", self.client.policy())
            .finish()
    }
}

fn validate_engine(engine: &str) -> Result<()> {
    if engine.trim().is_empty() {
        return Err(Error::validation_with_context(
            "engine must not be empty",
            ErrorContext::new().with_field_path("engine"),
        ));
    }
    Ok(())
}

fn single_payload(prompt: &Prompt, chat: bool) -> Result<Payload> {
    match (prompt, chat) {
        (Prompt::Text(text), true) => Ok(Payload::Chat(vec![Message::user(text.clone())])),
        (Prompt::Conversation(messages), true) => Ok(Payload::Chat(messages.clone())),
        (Prompt::Text(text), false) => Ok(Payload::Completion(vec![text.clone()])),
        (Prompt::Conversation(_), false) => Err(Error::validation_with_context(
            "the legacy completion engine does not accept conversations",
            ErrorContext::new()
                .with_field_path("prompt")
                .with_details("pass a text prompt or use a chat engine"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn chat_engines_wrap_text_as_one_user_message() {
        let payload = single_payload(&Prompt::text("hi"), true).unwrap();
        match payload {
            Payload::Chat(messages) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].role, MessageRole::User);
                assert_eq!(messages[0].content, "hi");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn legacy_engine_rejects_conversations() {
        let prompt = Prompt::conversation(vec![Message::user("hi")]);
        assert!(matches!(
            single_payload(&prompt, false),
            Err(Error::Validation { .. })
        ));
        assert_eq!(
            single_payload(&Prompt::text("hi"), false).unwrap(),
            Payload::Completion(vec!["hi".into()])
        );
    }

    #[test]
    fn blank_engine_is_invalid() {
        assert!(validate_engine("  ").is_err());
        assert!(validate_engine("gpt-4").is_ok());
    }
}
