//! AWS Bedrock Converse API adapter.
//!
//! Talks to the regional `bedrock-runtime` endpoint with a Bedrock API key
//! (bearer token) — no SigV4 signing. The Converse shape is vendor-neutral
//! across the models Bedrock hosts: one `messages` array of typed content
//! blocks, `system` as a block array, and `inferenceConfig` for sampling.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config;
use crate::types::{ImageAttachment, PromptRequest, Provider, TokenUsage};
use crate::Result;

use super::{text_at, u64_at, AdapterContext, ProviderAdapter, WireRequest};

const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct BedrockAdapter {
    ctx: AdapterContext,
    base_override: Option<String>,
}

impl BedrockAdapter {
    pub fn new(ctx: AdapterContext, base_override: Option<String>) -> Self {
        Self { ctx, base_override }
    }

    /// Converse image format tag from the attachment MIME type.
    fn image_format(image: &ImageAttachment) -> &'static str {
        if image.mime_type.contains("jpeg") {
            "jpeg"
        } else if image.mime_type.contains("gif") {
            "gif"
        } else if image.mime_type.contains("webp") {
            "webp"
        } else {
            "png"
        }
    }

    fn image_blocks(request: &PromptRequest) -> Vec<Value> {
        request
            .images
            .iter()
            .map(|image| {
                json!({
                    "image": {
                        "format": Self::image_format(image),
                        "source": { "bytes": image.base64_data },
                    }
                })
            })
            .collect()
    }

    /// One user turn. With a prompt split the static part, images and
    /// dynamic part share the turn in that order; Converse has no cache
    /// point support yet, so the split only shapes the content.
    fn content_blocks(request: &PromptRequest) -> Vec<Value> {
        match request.split_parts() {
            Some((static_part, dynamic_part)) => {
                let mut blocks = vec![json!({ "text": static_part })];
                blocks.extend(Self::image_blocks(request));
                blocks.push(json!({ "text": dynamic_part }));
                blocks
            }
            None => {
                let mut blocks = vec![json!({ "text": request.prompt })];
                blocks.extend(Self::image_blocks(request));
                blocks
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for BedrockAdapter {
    fn provider(&self) -> Provider {
        Provider::AwsBedrock
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest> {
        let provider = self.provider().as_str();
        let token = config::require(provider, "AWS_BEARER_TOKEN_BEDROCK")?;
        let base = match &self.base_override {
            Some(base) => base.clone(),
            None => {
                let region = config::require(provider, "AWS_REGION")?;
                format!("https://bedrock-runtime.{region}.amazonaws.com")
            }
        };

        let system = match &request.system_prompt {
            Some(system_prompt) => json!([{ "text": system_prompt }]),
            None => json!([]),
        };
        let generation = &request.generation_config;
        let body = json!({
            "messages": [{ "role": "user", "content": Self::content_blocks(request) }],
            "system": system,
            "inferenceConfig": {
                "maxTokens": generation.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                "temperature": generation.temperature,
            },
        });

        Ok(WireRequest {
            url: format!("{base}/model/{model}/converse"),
            headers: vec![("authorization".to_string(), format!("Bearer {token}"))],
            body,
        })
    }

    fn parse_response(&self, body: &Value) -> (String, TokenUsage) {
        let content = text_at(body, "/output/message/content/0/text").to_string();
        let usage = body.get("usage").map_or_else(TokenUsage::default, |usage| {
            TokenUsage::from_counts(
                u64_at(usage, "/inputTokens"),
                u64_at(usage, "/outputTokens"),
                None,
            )
            .with_cache_read(u64_at(usage, "/cacheReadInputTokens"))
            .with_cache_creation(u64_at(usage, "/cacheCreationInputTokens"))
        });
        (content, usage)
    }
}
