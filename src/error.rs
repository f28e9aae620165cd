use crate::error_code::ProviderErrorKind;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "request.prompt")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected shape, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "prompt_normalizer", "client_config")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for gptinference.
#[derive(Debug, Error)]
pub enum Error {
    /// The generation service rejected or failed the request.
    #[error("Provider error {kind}{}: {message}", format_status(.status))]
    Provider {
        kind: ProviderErrorKind,
        status: Option<u16>,
        message: String,
    },

    /// A transient failure persisted past the retry budget.
    #[error("Maximum number of retries ({retries}) exceeded: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Pricing unavailable for requested engine: {engine}")]
    UnknownPricing { engine: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" [HTTP {}]", s),
        None => String::new(),
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a provider error without an HTTP status (e.g. from a test double).
    pub fn provider(kind: ProviderErrorKind, msg: impl Into<String>) -> Self {
        Error::Provider {
            kind,
            status: None,
            message: msg.into(),
        }
    }

    /// Shorthand for the throttling error, the only kind retried by default.
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::provider(ProviderErrorKind::RateLimited, msg)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: msg.into(),
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// The provider error kind, if this is a provider failure.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Error::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this is a provider failure of a kind that is usually transient.
    ///
    /// Informational only; [`RetryPolicy`](crate::resilience::RetryPolicy) decides from its own
    /// retryable set.
    pub fn is_retryable_kind(&self) -> bool {
        self.provider_kind().map_or(false, |k| k.is_transient())
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
