//! Azure-hosted OpenAI adapter.
//!
//! Same chat-completions dialect as the OpenAI adapter, but the call targets
//! a customer deployment: endpoint, deployment name and API version come
//! from configuration and the key travels in an `api-key` header instead of
//! a bearer token.

use async_trait::async_trait;
use serde_json::Value;

use crate::config;
use crate::types::{PromptRequest, Provider, TokenUsage};
use crate::Result;

use super::openai::{chat_completion_body, parse_chat_completion};
use super::{AdapterContext, ProviderAdapter, WireRequest};

pub struct AzureOpenAiAdapter {
    ctx: AdapterContext,
    endpoint_override: Option<String>,
}

impl AzureOpenAiAdapter {
    pub fn new(ctx: AdapterContext, endpoint_override: Option<String>) -> Self {
        Self {
            ctx,
            endpoint_override,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AzureOpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::AzureOpenAi
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest> {
        let provider = self.provider().as_str();
        let endpoint = match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => config::require(provider, "AZURE_OPENAI_ENDPOINT")?,
        };
        let api_key = config::require(provider, "AZURE_OPENAI_API_KEY")?;
        let deployment = config::require(provider, "DEPLOYMENT_NAME")?;
        let api_version = config::require(provider, "API_VERSION")?;

        Ok(WireRequest {
            url: format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
            headers: vec![("api-key".to_string(), api_key)],
            body: chat_completion_body(model, request),
        })
    }

    fn parse_response(&self, body: &Value) -> (String, TokenUsage) {
        parse_chat_completion(body)
    }
}
