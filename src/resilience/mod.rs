//! # Resilience Module
//!
//! Retry with exponential backoff and jitter for rate-limited providers.
//!
//! ## Overview
//!
//! Remote generation APIs throttle aggressively. The retry policy:
//! - Retries only the error kinds it is told are transient (rate limiting by default)
//! - Returns every other failure immediately and unmodified
//! - Backs off exponentially, with optional jitter to avoid synchronized retry storms
//! - Gives up with [`Error::RetriesExhausted`](crate::Error::RetriesExhausted) once the budget
//!   is spent
//!
//! The wait is a real sleep on the calling task. That is the backpressure against the
//! provider; callers on a latency budget must bound it themselves.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RetryPolicy`] | Backoff parameters and the retryable error kinds |
//! | [`RetryingClient`] | Decorator applying a policy to a generation client |
//!
//! ## Example
//!
//! ```rust
//! use gptinference::resilience::RetryPolicy;
//! use gptinference::error_code::ProviderErrorKind;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new()
//!     .with_initial_delay(Duration::from_millis(500))
//!     .with_max_retries(5)
//!     .with_retryable([ProviderErrorKind::RateLimited, ProviderErrorKind::Overloaded]);
//! assert_eq!(policy.max_retries, 5);
//! ```
//!
//! The default retry budget is read from `OPENAI_MAX_TRIES_INT` (10 when unset).

pub mod retry;

pub use retry::{RetryPolicy, RetryingClient, MAX_TRIES_ENV};
