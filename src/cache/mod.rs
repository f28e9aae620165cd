//! # Request Cache Module
//!
//! A request-deduplicating cache persisted to an append-only JSON-lines file.
//!
//! ## Overview
//!
//! The cache is what makes repeated runs cheap:
//! - A request that was answered once is never sent to the provider again
//! - Everything is loaded into memory at startup; lookups never touch disk
//! - Writes are batched: new entries are appended at most once per `save_every`
//! - A crash loses at most the entries since the last flush, never earlier ones
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Synchronized map plus log, with periodic flushing |
//! | [`CacheConfig`] | Backing path and flush interval |
//! | [`CacheKey`] | Canonical request fingerprint |
//! | [`CacheValue`] | The cached first completion |
//! | [`CacheStats`] | Hit/miss/set/flush counters |
//!
//! ## Example
//!
//! ```rust
//! use gptinference::cache::{CacheConfig, CacheKey, CacheStore, CacheValue};
//! use gptinference::types::Prompt;
//! use std::time::Duration;
//!
//! let store = CacheStore::open(CacheConfig::new().with_save_every(Duration::from_secs(600)))?;
//! let key = CacheKey::new("gpt-4", &Prompt::text("\nHello"), "###", 0.0, 300);
//! store.set(key.clone(), CacheValue::new("Hi there"));
//! assert_eq!(store.get(&key).unwrap().first_response, "Hi there");
//! # Ok::<(), gptinference::Error>(())
//! ```
//!
//! ## File Format
//!
//! One record per line:
//!
//! ```text
//! {"engine":"gpt-4","prompt_kind":"text","prompt":"Hello","stop_token":"###","temperature":0.0,"max_tokens":300,"first_response":"Hi there"}
//! ```

mod key;
mod log;
mod store;

pub use key::{CacheKey, CacheValue, PromptKind};
pub use store::{CacheConfig, CacheStats, CacheStore, DEFAULT_SAVE_EVERY};
