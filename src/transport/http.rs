use std::env;
use std::time::Duration;

use serde_json::Value;

use crate::error::Error;
use crate::Result;

/// Thin wrapper around one pooled `reqwest` client.
///
/// All vendor calls go through [`HttpTransport::post_json`], which also owns
/// the status classification: throttling/overload responses become
/// [`Error::RateLimited`] (the only retryable class), everything else
/// non-2xx becomes a fatal [`Error::Provider`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(default_timeout())
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("RELAY_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("RELAY_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )))
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }

    /// POST a JSON body and return the parsed JSON response.
    pub async fn post_json(
        &self,
        provider: &'static str,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
    ) -> Result<Value> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if (200..300).contains(&status) {
            return Ok(serde_json::from_str(&text)?);
        }

        let message = error_message(&text);
        tracing::debug!(provider, status, %message, "vendor returned an error status");
        Err(classify(provider, status, message))
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(
        env::var("RELAY_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(120),
    )
}

/// Map an error status to the relay's taxonomy. 429 plus the overload and
/// throttling phrasings some vendors use for 5xx-class congestion are
/// transient; everything else is fatal.
fn classify(provider: &'static str, status: u16, message: String) -> Error {
    let throttled = status == 429
        || message.contains("overloaded")
        || message.contains("Throttling");
    if throttled {
        Error::RateLimited {
            provider,
            status,
            message,
        }
    } else {
        Error::Provider {
            provider,
            status: Some(status),
            message,
        }
    }
}

/// Dig the human-readable message out of common vendor error bodies:
/// `{"error": {"message": ...}}`, `{"error": "..."}`, `{"message": ...}`,
/// otherwise the raw (truncated) body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for pointer in ["/error/message", "/error", "/message"] {
            if let Some(message) = value.pointer(pointer).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    let mut raw = body.trim().to_string();
    if raw.len() > 512 {
        raw.truncate(512);
    }
    if raw.is_empty() {
        "no error body".to_string()
    } else {
        raw
    }
}
