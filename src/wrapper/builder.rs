use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::Wrapper;
use crate::cache::{CacheConfig, CacheStore};
use crate::client::GenerationClient;
use crate::resilience::{RetryPolicy, RetryingClient};
use crate::tokens::{ModelPricing, PricingTable};
use crate::transport::HttpTransport;
use crate::Result;

/// Builder for [`Wrapper`].
///
/// Without an explicit client the wrapper talks to OpenAI, configured from the environment.
/// A missing API key only fails once a request actually has to be sent, so a wrapper over a
/// fully populated cache runs without credentials.
pub struct WrapperBuilder {
    cache: CacheConfig,
    retry: Option<RetryPolicy>,
    client: Option<Arc<dyn GenerationClient>>,
    pricing: PricingTable,
}

impl WrapperBuilder {
    pub fn new() -> Self {
        Self {
            cache: CacheConfig::new(),
            retry: None,
            client: None,
            pricing: PricingTable::defaults(),
        }
    }

    /// Persist the cache to this JSON-lines file. Without a path the cache lives in memory only.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache = self.cache.with_path(path);
        self
    }

    /// Minimum time between cache flushes. Default 600 seconds.
    pub fn save_every(mut self, interval: Duration) -> Self {
        self.cache = self.cache.with_save_every(interval);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn client(mut self, client: impl GenerationClient + 'static) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    pub fn shared_client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Price an engine missing from the built-in list, or override a built-in price.
    pub fn pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing.register(pricing);
        self
    }

    pub fn pricing_table(mut self, table: PricingTable) -> Self {
        self.pricing = table;
        self
    }

    /// Load the cache and assemble the wrapper.
    pub fn build(self) -> Result<Wrapper> {
        let store = Arc::new(CacheStore::open(self.cache)?);
        let client: Arc<dyn GenerationClient> = match self.client {
            Some(client) => client,
            None => Arc::new(HttpTransport::openai_from_env()?),
        };
        let policy = self.retry.unwrap_or_default();
        info!(
            client = client.name(),
            cache_entries = store.len(),
            max_retries = policy.max_retries,
            "wrapper ready"
        );
        Ok(Wrapper {
            store,
            client: RetryingClient::new(client, policy),
            pricing: self.pricing,
        })
    }
}

impl Default for WrapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
