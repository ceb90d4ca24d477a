//! Vendor adapters.
//!
//! Each vendor gets one [`ProviderAdapter`] implementation that translates
//! the canonical [`PromptRequest`] into the vendor's wire format, invokes it
//! through the retry executor, and normalizes the raw response into an
//! [`InvocationResult`]. The trait is object-safe; the registry dispatches
//! through `Arc<dyn ProviderAdapter>`.
//!
//! Together, Groq and OpenRouter speak the OpenAI chat-completions dialect
//! and are parameterized instances of the OpenAI adapter; Azure shares its
//! body format but has its own endpoint and auth scheme.

pub mod anthropic;
pub mod azure;
pub mod bedrock;
pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::ContextCacheManager;
use crate::error::Error;
use crate::retry::{self, RetryPolicy};
use crate::transport::HttpTransport;
use crate::types::{InvocationResult, PromptRequest, Provider, TokenUsage};
use crate::Result;

pub use anthropic::AnthropicAdapter;
pub use azure::AzureOpenAiAdapter;
pub use bedrock::BedrockAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiCompatibleAdapter;

/// Shared machinery handed to every adapter at construction.
#[derive(Clone)]
pub struct AdapterContext {
    pub http: Arc<HttpTransport>,
    pub retry: RetryPolicy,
    pub cache: Arc<ContextCacheManager>,
}

/// A fully built vendor HTTP request.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// One vendor's request translation, invocation and response normalization.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    fn context(&self) -> &AdapterContext;

    /// Map canonical fields onto the vendor schema. Credentials are resolved
    /// here, so a missing credential fails before any network I/O.
    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest>;

    /// Extract the first text content block and the canonical usage from a
    /// raw vendor response. Missing content degrades to an empty string —
    /// "no content" is a valid result, never an error.
    fn parse_response(&self, body: &Value) -> (String, TokenUsage);

    /// Build, invoke through the retry executor, normalize. Adapters with a
    /// multi-call flow (the Gemini cached path) override this.
    async fn generate(&self, model: &str, request: &PromptRequest) -> Result<InvocationResult> {
        let wire = self.build_request(model, request)?;
        let (raw, duration) = invoke(self.context(), self.provider(), &wire).await?;
        let (content, token_usage) = self.parse_response(&raw);
        Ok(InvocationResult {
            content,
            token_usage,
            duration_millis: duration.as_millis() as u64,
        })
    }
}

/// Execute one wire request under the adapter's retry policy. Only
/// rate-limit-class failures are repeated; the returned duration covers the
/// last attempt alone.
pub(crate) async fn invoke(
    ctx: &AdapterContext,
    provider: Provider,
    wire: &WireRequest,
) -> Result<(Value, Duration)> {
    retry::execute(
        || ctx.http.post_json(provider.as_str(), &wire.url, &wire.headers, &wire.body),
        Error::is_rate_limited,
        &ctx.retry,
    )
    .await
}

/// First text block at `pointer`, or the empty degraded result.
pub(crate) fn text_at<'a>(body: &'a Value, pointer: &str) -> &'a str {
    body.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}

pub(crate) fn u64_at(body: &Value, pointer: &str) -> u64 {
    body.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
pub(crate) fn test_context() -> AdapterContext {
    use crate::cache::CacheConfig;

    AdapterContext {
        http: Arc::new(HttpTransport::new().expect("test transport")),
        retry: RetryPolicy::default(),
        cache: Arc::new(ContextCacheManager::new(CacheConfig::default())),
    }
}
