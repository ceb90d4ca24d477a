//! Provider registry and dispatch.
//!
//! One adapter instance per vendor, registered in a lookup table at client
//! construction — adding a vendor is a closed, local change. The dispatcher
//! resolves a parsed identifier to its adapter and forwards the call; it
//! performs no retries and no normalization of its own.

pub mod catalog;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::providers::{
    AdapterContext, AnthropicAdapter, AzureOpenAiAdapter, BedrockAdapter, GeminiAdapter,
    OpenAiCompatibleAdapter, ProviderAdapter,
};
use crate::types::{InvocationResult, ModelIdentifier, PromptRequest, Provider};
use crate::Result;

pub use catalog::{all_model_identifiers, models_for};

pub struct ProviderRegistry {
    adapters: HashMap<Provider, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Register one adapter per vendor. `base_urls` carries per-provider
    /// endpoint overrides, primarily for tests against a mock server.
    pub fn new(ctx: AdapterContext, base_urls: &HashMap<Provider, String>) -> Self {
        let base = |provider: Provider| base_urls.get(&provider).cloned();

        let mut adapters: HashMap<Provider, Arc<dyn ProviderAdapter>> = HashMap::new();
        adapters.insert(
            Provider::OpenAi,
            Arc::new(OpenAiCompatibleAdapter::openai(ctx.clone(), base(Provider::OpenAi))),
        );
        adapters.insert(
            Provider::Anthropic,
            Arc::new(AnthropicAdapter::new(ctx.clone(), base(Provider::Anthropic))),
        );
        adapters.insert(
            Provider::GoogleGemini,
            Arc::new(GeminiAdapter::new(ctx.clone(), base(Provider::GoogleGemini))),
        );
        adapters.insert(
            Provider::AzureOpenAi,
            Arc::new(AzureOpenAiAdapter::new(ctx.clone(), base(Provider::AzureOpenAi))),
        );
        adapters.insert(
            Provider::AwsBedrock,
            Arc::new(BedrockAdapter::new(ctx.clone(), base(Provider::AwsBedrock))),
        );
        adapters.insert(
            Provider::Together,
            Arc::new(OpenAiCompatibleAdapter::together(ctx.clone(), base(Provider::Together))),
        );
        adapters.insert(
            Provider::Groq,
            Arc::new(OpenAiCompatibleAdapter::groq(ctx.clone(), base(Provider::Groq))),
        );
        adapters.insert(
            Provider::OpenRouter,
            Arc::new(OpenAiCompatibleAdapter::openrouter(ctx, base(Provider::OpenRouter))),
        );
        Self { adapters }
    }

    /// Select and forward. The adapter owns retries and normalization.
    pub async fn dispatch(
        &self,
        identifier: &ModelIdentifier,
        request: &PromptRequest,
    ) -> Result<InvocationResult> {
        let adapter = self
            .adapters
            .get(&identifier.provider)
            .ok_or_else(|| Error::UnsupportedProvider(identifier.provider.to_string()))?;
        adapter.generate(&identifier.model, request).await
    }
}
