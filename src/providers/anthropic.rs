//! Anthropic Messages API adapter.
//!
//! Key differences from the OpenAI dialect:
//! - The system prompt is a top-level `system` parameter, not a message.
//! - Content uses typed blocks: `[{"type": "text", "text": "..."}]`.
//! - `max_tokens` is required, not optional.
//! - Context caching is declared inline: when a static/dynamic split is
//!   present, the static part and image blocks carry
//!   `cache_control: {"type": "ephemeral"}` markers instead of going through
//!   a separate cache-creation call.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config;
use crate::types::{PromptRequest, Provider, TokenUsage};
use crate::Result;

use super::{text_at, u64_at, AdapterContext, ProviderAdapter, WireRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl AnthropicAdapter {
    pub fn new(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            base_url: base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string()),
        }
    }

    fn image_blocks(request: &PromptRequest) -> Vec<Value> {
        request
            .images
            .iter()
            .map(|image| {
                json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.mime_type,
                        "data": image.base64_data,
                    },
                    "cache_control": { "type": "ephemeral" },
                })
            })
            .collect()
    }

    /// Each image gets its own user turn, after the static part (cached
    /// path) or after the prompt (plain path).
    fn messages(request: &PromptRequest) -> Vec<Value> {
        let mut messages = Vec::new();
        if let Some((static_part, dynamic_part)) = request.split_parts() {
            messages.push(json!({
                "role": "user",
                "content": [{
                    "type": "text",
                    "text": static_part,
                    "cache_control": { "type": "ephemeral" },
                }],
            }));
            for block in Self::image_blocks(request) {
                messages.push(json!({ "role": "user", "content": [block] }));
            }
            messages.push(json!({
                "role": "user",
                "content": [{ "type": "text", "text": dynamic_part }],
            }));
        } else {
            messages.push(json!({
                "role": "user",
                "content": [{ "type": "text", "text": request.prompt }],
            }));
            for block in Self::image_blocks(request) {
                messages.push(json!({ "role": "user", "content": [block] }));
            }
        }
        messages
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest> {
        let api_key = config::require(self.provider().as_str(), "ANTHROPIC_API_KEY")?;

        let generation = &request.generation_config;
        let mut body = json!({
            "model": model,
            "messages": Self::messages(request),
            "max_tokens": generation.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": generation.temperature,
        });
        if let Some(system_prompt) = &request.system_prompt {
            body["system"] = json!(system_prompt);
        }

        Ok(WireRequest {
            url: format!("{}/v1/messages", self.base_url),
            headers: vec![
                ("x-api-key".to_string(), api_key),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            body,
        })
    }

    fn parse_response(&self, body: &Value) -> (String, TokenUsage) {
        let content = text_at(body, "/content/0/text").to_string();
        let usage = body.get("usage").map_or_else(TokenUsage::default, |usage| {
            TokenUsage::from_counts(
                u64_at(usage, "/input_tokens"),
                u64_at(usage, "/output_tokens"),
                None,
            )
            .with_cache_read(u64_at(usage, "/cache_read_input_tokens"))
            .with_cache_creation(u64_at(usage, "/cache_creation_input_tokens"))
        });
        (content, usage)
    }
}
