//! Exponential backoff with jitter for transient provider failures.

use async_trait::async_trait;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::client::{GenerationClient, GenerationRequest};
use crate::error_code::ProviderErrorKind;
use crate::types::RawResponse;
use crate::{Error, Result};

/// Environment variable overriding the default retry budget.
pub const MAX_TRIES_ENV: &str = "OPENAI_MAX_TRIES_INT";

const DEFAULT_MAX_RETRIES: u32 = 10;

/// When and how long to wait before trying a failed call again.
///
/// Only errors whose [`ProviderErrorKind`] is in `retryable` are retried; everything else is
/// returned as-is on the first failure. The n-th wait is
/// `initial_delay * Π(exponential_base * (1 + jitter * U))` with `U` uniform in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
    pub max_retries: u32,
    pub retryable: HashSet<ProviderErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            exponential_base: 2.0,
            jitter: true,
            max_retries: max_retries_from_env(),
            retryable: HashSet::from([ProviderErrorKind::RateLimited]),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = base;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Replace the set of retryable kinds.
    pub fn with_retryable(mut self, kinds: impl IntoIterator<Item = ProviderErrorKind>) -> Self {
        self.retryable = kinds.into_iter().collect();
        self
    }

    pub fn is_retryable(&self, err: &Error) -> bool {
        err.provider_kind()
            .map_or(false, |kind| self.retryable.contains(&kind))
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        let u = if self.jitter { rand::random::<f64>() } else { 0.0 };
        let secs = delay.as_secs_f64() * self.exponential_base * (1.0 + u);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the budget runs out.
    ///
    /// Makes at most `max_retries + 1` attempts. The wait between attempts is a real sleep on
    /// the calling task.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        let mut delay = self.initial_delay;
        loop {
            let err = match op().await {
                Ok(v) => return Ok(v),
                Err(e) if self.is_retryable(&e) => e,
                Err(e) => return Err(e),
            };
            retries += 1;
            if retries > self.max_retries {
                return Err(Error::RetriesExhausted {
                    retries: self.max_retries,
                    source: Box::new(err),
                });
            }
            delay = self.next_delay(delay);
            warn!(
                retry = retries,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient provider error, backing off"
            );
            drop(err);
            tokio::time::sleep(delay).await;
        }
    }
}

fn max_retries_from_env() -> u32 {
    std::env::var(MAX_TRIES_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_RETRIES)
}

/// A [`GenerationClient`] whose every call goes through a [`RetryPolicy`].
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: GenerationClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for RetryingClient<C> {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse> {
        self.policy.run(move || self.inner.generate(request)).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
