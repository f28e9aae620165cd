//! # gptinference
//!
//! Cached, retrying, cost-accounted access to OpenAI-compatible text generation.
//!
//! ## Overview
//!
//! Research pipelines send the same prompts over and over. This library puts a persistent
//! request cache in front of the provider so repeated runs are free, deterministic, and work
//! offline once the cache is warm.
//!
//! - **Persistent cache**: append-only JSON-lines file, loaded at startup and flushed at most
//!   once per interval, tolerant of a truncated tail after a crash
//! - **Retry**: exponential backoff with jitter on rate limiting, fatal errors surface at once
//! - **Cost accounting**: every call reports its dollar cost; cache hits cost nothing
//! - **Batching**: several prompts in one provider request, deduplicated against the cache
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gptinference::{CallRequest, LastCallSink, Wrapper};
//!
//! #[tokio::main]
//! async fn main() -> gptinference::Result<()> {
//!     let wrapper = Wrapper::builder().cache_path("cache.jsonl").build()?;
//!     let cost = LastCallSink::new();
//!
//!     let request = CallRequest::new("Tell me fun things to do in San Francisco.", "gpt-4o")
//!         .with_max_tokens(500);
//!     let answer = wrapper.call(&request, &cost).await?;
//!     println!("{answer}\n{:?}", cost.last());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`wrapper`] | Single and batch entry points, builder |
//! | [`cache`] | Cache keys and the persistent store |
//! | [`resilience`] | Retry policy |
//! | [`client`] | Generation service contract and connection settings |
//! | [`transport`] | OpenAI-compatible HTTP client |
//! | [`tokens`] | Engine pricing |
//! | [`cost`] | Per-call cost records and sinks |
//! | [`extract`] | Parsing two-part answers |
//! | [`types`] | Prompts, messages, raw responses |

pub mod cache;
pub mod client;
pub mod cost;
pub mod error_code;
pub mod extract;
pub mod resilience;
pub mod tokens;
pub mod transport;
pub mod types;
pub mod wrapper;

// Re-export main types for convenience
pub use cache::{CacheKey, CacheStore, CacheValue};
pub use client::{ClientConfig, GenerationClient};
pub use cost::{CallCost, CostSink, InMemoryCostSink, LastCallSink, NoopCostSink};
pub use error_code::ProviderErrorKind;
pub use resilience::RetryPolicy;
pub use tokens::cost_in_dollars;
pub use types::{Message, MessageRole, Prompt};
pub use wrapper::{BatchParams, CallRequest, Wrapper, WrapperBuilder};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
