use thiserror::Error;

/// Unified error type for the relay.
///
/// This aggregates transport, configuration and vendor failures into
/// actionable, high-level categories. The retry layer consults
/// [`Error::is_rate_limited`] to decide whether an attempt may be repeated;
/// everything else is surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential or region value is absent. Raised before any
    /// network call is made.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The vendor segment of a model identifier is not a known provider.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The model identifier has no model segment.
    #[error("model identifier {0:?} has no model segment")]
    MissingModel(String),

    /// The vendor signaled throttling or overload. Retried per policy.
    #[error("{provider} rate limited (HTTP {status}): {message}")]
    RateLimited {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Any other vendor-side failure: rejected auth, malformed request,
    /// content policy. Not retried.
    #[error("{provider} request failed{}: {message}", format_status(.status))]
    Provider {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The retry budget was consumed without a successful attempt.
    #[error("maximum number of retries exceeded after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Internal to the context cache manager. Never surfaced to callers;
    /// always triggers fallback to the uncached path.
    #[error("context cache error: {0}")]
    Cache(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_status(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" (HTTP {status})"))
        .unwrap_or_default()
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a cache-internal error.
    pub fn cache(message: impl Into<String>) -> Self {
        Error::Cache(message.into())
    }

    /// Whether this error is a transient rate-limit signal. This is the only
    /// error class the retry executor will repeat an attempt for.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}
