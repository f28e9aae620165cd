use keyring::Entry;
use std::env;
use std::time::Duration;
use url::Url;

use crate::{Error, ErrorContext, Result};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for an OpenAI-compatible endpoint.
///
/// A missing API key is not an error here: runs served entirely from the cache never need
/// one. The transport reports it only when a request actually has to be sent.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub organization: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            organization: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// OpenAI settings from the environment.
    ///
    /// - `OPENAI_API_KEY` (falls back to the OS keyring entry `gptinference/openai`)
    /// - `OPENAI_BASE_URL` (default `https://api.openai.com/v1`)
    /// - `OPENAI_ORG`
    /// - `GPTINFERENCE_HTTP_TIMEOUT_SECS` (default 60)
    pub fn openai_from_env() -> Self {
        Self {
            api_key: lookup_api_key("openai", "OPENAI_API_KEY"),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_BASE_URL.to_string()),
            organization: env::var("OPENAI_ORG").ok().filter(|s| !s.is_empty()),
            timeout: timeout_from_env(),
        }
    }

    /// Together AI settings from the environment (`TOGETHER_API_KEY`).
    pub fn together_from_env() -> Self {
        Self {
            api_key: lookup_api_key("together", "TOGETHER_API_KEY"),
            base_url: TOGETHER_BASE_URL.to_string(),
            organization: None,
            timeout: timeout_from_env(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse and check the base URL.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("client_config"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme '{}'", url.scheme()),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("client_config"),
            ));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn lookup_api_key(provider: &str, env_var: &str) -> Option<String> {
    // 1. Environment variable
    if let Some(key) = env::var(env_var).ok().filter(|k| !k.is_empty()) {
        return Some(key);
    }
    // 2. OS keyring
    Entry::new("gptinference", provider)
        .ok()
        .and_then(|entry| entry.get_password().ok())
        .filter(|k| !k.is_empty())
}

fn timeout_from_env() -> Duration {
    let secs = env::var("GPTINFERENCE_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_validation() {
        assert!(ClientConfig::new(OPENAI_BASE_URL).base_url().is_ok());
        assert!(matches!(
            ClientConfig::new("not a url").base_url(),
            Err(Error::Configuration { .. })
        ));
        assert!(ClientConfig::new("ftp://example.com").base_url().is_err());
    }

    #[test]
    fn together_reads_its_own_key() {
        env::set_var("TOGETHER_API_KEY", "tg-test");
        let cfg = ClientConfig::together_from_env();
        env::remove_var("TOGETHER_API_KEY");
        assert_eq!(cfg.api_key.as_deref(), Some("tg-test"));
        assert_eq!(cfg.base_url().unwrap().as_str(), "https://api.together.xyz/v1");
        assert!(cfg.organization.is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = ClientConfig::new(OPENAI_BASE_URL).with_api_key("sk-secret");
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
