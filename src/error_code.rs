//! Provider error kinds: the closed set of failure classes a generation service can report.
//!
//! Every provider failure is classified into exactly one [`ProviderErrorKind`]. The retry
//! policy matches on the kind instead of inspecting messages, so adding a new transient class
//! is a one-line change to the policy's retryable set.
//!
//! | Prefix | Category | Description                   |
//! |--------|----------|-------------------------------|
//! | E1xxx  | client   | Request-side errors           |
//! | E2xxx  | rate     | Rate limit and quota errors   |
//! | E3xxx  | server   | Provider-side errors          |
//! | E9xxx  | unknown  | Catch-all / unclassified      |
//!
//! ## Example
//!
//! ```rust
//! use gptinference::error_code::ProviderErrorKind;
//!
//! let kind = ProviderErrorKind::from_status(429);
//! assert_eq!(kind, ProviderErrorKind::RateLimited);
//! assert_eq!(kind.code(), "E2001");
//! assert!(kind.is_transient());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure class reported by a generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// E1001: Malformed request, invalid parameters, or missing required fields
    InvalidRequest,
    /// E1002: Invalid, expired, or missing API key
    Authentication,
    /// E1003: Valid credentials but insufficient permissions
    PermissionDenied,
    /// E1004: Requested model or endpoint does not exist
    NotFound,
    /// E1005: Input exceeds context window or payload size limit
    RequestTooLarge,
    /// E2001: Request rate limit exceeded
    RateLimited,
    /// E2002: Account usage quota or billing limit reached
    QuotaExhausted,
    /// E3001: Internal server error on provider side
    ServerError,
    /// E3002: Provider temporarily overloaded
    Overloaded,
    /// E3003: Request timed out before a response was received
    Timeout,
    /// E9999: Error could not be classified
    Unknown,
}

impl ProviderErrorKind {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::Authentication => "E1002",
            Self::PermissionDenied => "E1003",
            Self::NotFound => "E1004",
            Self::RequestTooLarge => "E1005",
            Self::RateLimited => "E2001",
            Self::QuotaExhausted => "E2002",
            Self::ServerError => "E3001",
            Self::Overloaded => "E3002",
            Self::Timeout => "E3003",
            Self::Unknown => "E9999",
        }
    }

    /// Returns the snake_case name (e.g., `"rate_limited"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RequestTooLarge => "request_too_large",
            Self::RateLimited => "rate_limited",
            Self::QuotaExhausted => "quota_exhausted",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the failure is plausibly transient.
    ///
    /// This is a classification only. Which kinds are actually retried is decided by
    /// [`RetryPolicy::retryable`](crate::resilience::RetryPolicy), whose default set is
    /// just [`RateLimited`](Self::RateLimited).
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Overloaded | Self::Timeout
        )
    }

    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited,
            503 | 529 => Self::Overloaded,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Maps a provider `error.code` / `error.type` string to a kind.
    ///
    /// OpenAI reports both throttling and billing problems as HTTP 429, so the body code is
    /// what tells `rate_limit_exceeded` apart from `insufficient_quota`.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let kind = match provider_code {
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "authentication" | "invalid_api_key" | "authentication_error" => {
                Self::Authentication
            }
            "permission_denied" | "permission_error" => Self::PermissionDenied,
            "not_found" | "model_not_found" => Self::NotFound,
            "request_too_large" | "context_length_exceeded" => Self::RequestTooLarge,
            "rate_limited" | "rate_limit_exceeded" | "requests" | "tokens" => Self::RateLimited,
            "quota_exhausted" | "insufficient_quota" => Self::QuotaExhausted,
            "server_error" => Self::ServerError,
            "overloaded" | "overloaded_error" | "engine_overloaded" => Self::Overloaded,
            "timeout" => Self::Timeout,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ProviderErrorKind::from_status(429), ProviderErrorKind::RateLimited);
        assert_eq!(ProviderErrorKind::from_status(401), ProviderErrorKind::Authentication);
        assert_eq!(ProviderErrorKind::from_status(503), ProviderErrorKind::Overloaded);
        assert_eq!(ProviderErrorKind::from_status(502), ProviderErrorKind::ServerError);
        assert_eq!(ProviderErrorKind::from_status(418), ProviderErrorKind::Unknown);
    }

    #[test]
    fn quota_is_not_transient() {
        let kind = ProviderErrorKind::from_provider_code("insufficient_quota").unwrap();
        assert_eq!(kind, ProviderErrorKind::QuotaExhausted);
        assert!(!kind.is_transient());
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(
            ProviderErrorKind::RateLimited.to_string(),
            "rate_limited (E2001)"
        );
    }
}
