//! Client facade.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{CacheConfig, CacheStats, ContextCacheManager};
use crate::providers::AdapterContext;
use crate::registry::{self, ProviderRegistry};
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;
use crate::types::{InvocationResult, ModelIdentifier, PromptRequest, Provider};
use crate::Result;

/// Builder for a [`RelayClient`] with custom retry, cache and transport
/// configuration. The surface is intentionally small.
pub struct RelayClientBuilder {
    retry: RetryPolicy,
    cache: CacheConfig,
    http_timeout: Option<Duration>,
    base_urls: HashMap<Provider, String>,
}

impl RelayClientBuilder {
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
            http_timeout: None,
            base_urls: HashMap::new(),
        }
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// TTL for vendor-side context cache entries.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Override one provider's endpoint. Primarily for testing against a
    /// mock server; production endpoints are built in.
    pub fn base_url_override(mut self, provider: Provider, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, base_url.into());
        self
    }

    pub fn build(self) -> Result<RelayClient> {
        let http = Arc::new(match self.http_timeout {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new()?,
        });
        let cache = Arc::new(ContextCacheManager::new(self.cache));
        let ctx = AdapterContext {
            http,
            retry: self.retry,
            cache: cache.clone(),
        };
        Ok(RelayClient {
            registry: ProviderRegistry::new(ctx, &self.base_urls),
            cache,
        })
    }
}

impl Default for RelayClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The single entry point: parses composite identifiers, dispatches to the
/// matching vendor adapter, and hands back the canonical result.
pub struct RelayClient {
    registry: ProviderRegistry,
    cache: Arc<ContextCacheManager>,
}

impl RelayClient {
    /// A client with default policy everywhere.
    pub fn new() -> Result<Self> {
        RelayClientBuilder::new().build()
    }

    pub fn builder() -> RelayClientBuilder {
        RelayClientBuilder::new()
    }

    /// Generate text for `request` on the model named by a
    /// `"vendor/model"` identifier.
    ///
    /// The caller gets either a well-formed [`InvocationResult`] or one
    /// typed error — never a partial result. Wrap the future in
    /// `tokio::time::timeout` for a deadline; cancellation aborts the
    /// in-flight attempt and triggers no further retries.
    pub async fn generate(
        &self,
        identifier: &str,
        request: &PromptRequest,
    ) -> Result<InvocationResult> {
        let identifier = ModelIdentifier::parse(identifier)?;
        let span = tracing::debug_span!(
            "generate",
            provider = %identifier.provider,
            model = %identifier.model,
            request_id = %Uuid::new_v4(),
        );
        self.registry
            .dispatch(&identifier, request)
            .instrument(span)
            .await
    }

    /// Every supported `"vendor/model"` identifier — the listing endpoint's
    /// payload.
    pub fn model_identifiers(&self) -> &'static [String] {
        registry::all_model_identifiers()
    }

    /// Context cache counters (hits, misses, creations, opt-outs).
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn identifier_failures_resolve_before_any_adapter_work() {
        let client = RelayClient::new().unwrap();
        let request = PromptRequest::new("hi");

        let err = client.generate("mystery/model", &request).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedProvider(_)));

        let err = client.generate("openai", &request).await.unwrap_err();
        assert!(matches!(err, Error::MissingModel(_)));
    }

    #[test]
    fn catalog_is_exposed_through_the_client() {
        let client = RelayClient::new().unwrap();
        assert!(client
            .model_identifiers()
            .iter()
            .any(|id| id == "openai/gpt-4o"));
    }
}
