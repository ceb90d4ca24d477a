//! Google Gemini generateContent adapter.
//!
//! Wire differences: `contents`/`parts` instead of `messages`, the system
//! prompt travels as `systemInstruction`, parameters sit in
//! `generationConfig` (`maxOutputTokens`), and the API key is a `?key=`
//! query parameter.
//!
//! This is the one adapter with a server-side cache flow: when the request
//! carries a static/dynamic split (or images), the static context is stored
//! once through the `cachedContents` endpoint and later calls generate
//! against the returned handle, sending only the dynamic part. Handles are
//! tracked by the [`ContextCacheManager`](crate::cache::ContextCacheManager);
//! any failure on the cached path permanently opts the model out and falls
//! back to the single-shot call below.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::cache::{fingerprint, CreatedCache};
use crate::config;
use crate::error::Error;
use crate::types::{InvocationResult, PromptRequest, Provider, TokenUsage};
use crate::Result;

use super::{invoke, text_at, u64_at, AdapterContext, ProviderAdapter, WireRequest};

const PROVIDER_NAME: &str = "google-gemini";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

pub struct GeminiAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            base_url: base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        }
    }

    fn generation_config(request: &PromptRequest) -> Value {
        json!({
            "temperature": request.generation_config.temperature,
            "maxOutputTokens": request
                .generation_config
                .max_tokens
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        })
    }

    fn inline_image(image: &crate::types::ImageAttachment) -> Value {
        json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": image.base64_data,
            }
        })
    }

    fn system_instruction(request: &PromptRequest) -> Option<Value> {
        request
            .system_prompt
            .as_ref()
            .map(|system| json!({ "parts": [{ "text": system }] }))
    }

    fn generate_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        )
    }

    /// The static context stored server-side: the static part as an inline
    /// `text/plain` blob plus every image attachment.
    fn cached_contents_body(&self, model: &str, request: &PromptRequest, static_part: &str) -> Value {
        let mut parts = Vec::new();
        if !static_part.is_empty() {
            parts.push(json!({
                "inlineData": {
                    "mimeType": "text/plain",
                    "data": BASE64.encode(static_part),
                }
            }));
        }
        parts.extend(request.images.iter().map(Self::inline_image));

        let mut body = json!({
            "model": format!("models/{model}"),
            "contents": [{ "role": "user", "parts": parts }],
            "ttl": format!("{}s", self.ctx.cache.config().ttl.as_secs()),
        });
        if let Some(system) = Self::system_instruction(request) {
            body["systemInstruction"] = system;
        }
        body
    }

    async fn generate_cached(
        &self,
        model: &str,
        request: &PromptRequest,
    ) -> Result<InvocationResult> {
        let api_key = config::require(PROVIDER_NAME, "GEMINI_API_KEY")?;
        let split = request.split_parts();
        let static_part = split.map_or("", |(static_part, _)| static_part);

        let key = fingerprint(Provider::GoogleGemini, model, static_part, &request.images);
        let creation_url = format!("{}/cachedContents?key={}", self.base_url, api_key);
        let creation_body = self.cached_contents_body(model, request, static_part);
        let http = &self.ctx.http;

        // Creation is a single shot, not retried; the fallback path covers
        // its failures.
        let outcome = self
            .ctx
            .cache
            .get_or_create(&key, || async move {
                let raw = http
                    .post_json(PROVIDER_NAME, &creation_url, &[], &creation_body)
                    .await
                    .map_err(|error| Error::cache(format!("cachedContents creation failed: {error}")))?;
                let handle = raw
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::cache("cachedContents response missing name"))?
                    .to_string();
                Ok(CreatedCache {
                    handle,
                    creation_tokens: u64_at(&raw, "/usageMetadata/totalTokenCount"),
                })
            })
            .await?;

        // With an images-only cache there is no dynamic part; the full
        // prompt is the per-call content.
        let user_text = match split {
            Some((_, dynamic_part)) => dynamic_part,
            None => request.prompt.as_str(),
        };
        let wire = WireRequest {
            url: self.generate_url(model, &api_key),
            headers: Vec::new(),
            body: json!({
                "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
                "cachedContent": outcome.handle,
                "generationConfig": Self::generation_config(request),
            }),
        };
        let (raw, duration) = invoke(&self.ctx, Provider::GoogleGemini, &wire).await?;
        let (content, usage) = self.parse_response(&raw);
        Ok(InvocationResult {
            content,
            token_usage: usage.with_cache_creation(outcome.creation_tokens),
            duration_millis: duration.as_millis() as u64,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> Provider {
        Provider::GoogleGemini
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest> {
        let model = model.trim_start_matches("gemini/");
        let api_key = config::require(PROVIDER_NAME, "GEMINI_API_KEY")?;

        let mut parts = vec![json!({ "text": request.prompt })];
        parts.extend(request.images.iter().map(Self::inline_image));

        let mut body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": Self::generation_config(request),
        });
        if let Some(system) = Self::system_instruction(request) {
            body["systemInstruction"] = system;
        }

        Ok(WireRequest {
            url: self.generate_url(model, &api_key),
            headers: Vec::new(),
            body,
        })
    }

    fn parse_response(&self, body: &Value) -> (String, TokenUsage) {
        let content = text_at(body, "/candidates/0/content/parts/0/text").to_string();
        let usage = body
            .get("usageMetadata")
            .map_or_else(TokenUsage::default, |usage| {
                TokenUsage::from_counts(
                    u64_at(usage, "/promptTokenCount"),
                    u64_at(usage, "/candidatesTokenCount"),
                    usage.pointer("/totalTokenCount").and_then(Value::as_u64),
                )
                .with_cache_read(u64_at(usage, "/cachedContentTokenCount"))
            });
        (content, usage)
    }

    async fn generate(&self, model: &str, request: &PromptRequest) -> Result<InvocationResult> {
        let model = model.trim_start_matches("gemini/");
        let cacheable = request.split_parts().is_some() || !request.images.is_empty();

        if cacheable && !self.ctx.cache.is_unsupported(Provider::GoogleGemini, model) {
            match self.generate_cached(model, request).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    self.ctx.cache.mark_unsupported(Provider::GoogleGemini, model);
                    tracing::warn!(model, %error, "unable to use cached content, retrying uncached");
                }
            }
        }

        let wire = self.build_request(model, request)?;
        let (raw, duration) = invoke(&self.ctx, Provider::GoogleGemini, &wire).await?;
        let (content, token_usage) = self.parse_response(&raw);
        Ok(InvocationResult {
            content,
            token_usage,
            duration_millis: duration.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GenerationConfig, ImageAttachment};

    fn adapter() -> GeminiAdapter {
        std::env::set_var("GEMINI_API_KEY", "gm-test");
        GeminiAdapter::new(super::super::test_context(), None)
    }

    #[test]
    fn request_uses_generation_config_and_query_key() {
        let request = PromptRequest::new("hello")
            .with_system_prompt("be brief")
            .with_generation_config(GenerationConfig {
                max_tokens: Some(2048),
                ..Default::default()
            });
        let wire = adapter()
            .build_request("gemini-1.5-pro-002", &request)
            .unwrap();
        assert_eq!(
            wire.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro-002:generateContent?key=gm-test"
        );
        assert_eq!(wire.body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(wire.body["generationConfig"]["temperature"], 0.0);
        assert_eq!(
            wire.body["systemInstruction"]["parts"][0]["text"],
            "be brief"
        );
        assert_eq!(wire.body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn legacy_model_prefix_is_stripped() {
        let wire = adapter()
            .build_request("gemini/gemini-2.0-flash-001", &PromptRequest::new("hi"))
            .unwrap();
        assert!(wire.url.contains("/models/gemini-2.0-flash-001:generateContent"));
    }

    #[test]
    fn images_become_inline_data_parts() {
        let request = PromptRequest::new("describe")
            .with_images(vec![ImageAttachment::new("image/jpeg", "cGl4ZWxz")]);
        let wire = adapter()
            .build_request("gemini-1.5-flash-002", &request)
            .unwrap();
        let part = &wire.body["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(part["mimeType"], "image/jpeg");
        assert_eq!(part["data"], "cGl4ZWxz");
    }

    #[test]
    fn cached_contents_body_inlines_the_static_part() {
        let request = PromptRequest::new("ignored")
            .with_system_prompt("sys")
            .with_prompt_parts("shared prefix", "question");
        let gemini = adapter();
        let body = gemini.cached_contents_body("gemini-1.5-pro-002", &request, "shared prefix");
        assert_eq!(body["model"], "models/gemini-1.5-pro-002");
        assert_eq!(body["ttl"], "60s");
        let blob = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(blob["mimeType"], "text/plain");
        assert_eq!(blob["data"], BASE64.encode("shared prefix"));
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
    }

    #[test]
    fn parse_keeps_the_vendor_total_and_cache_reads() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "hi" }], "role": "model" } }],
            "usageMetadata": {
                "promptTokenCount": 20,
                "candidatesTokenCount": 5,
                "totalTokenCount": 30,
                "cachedContentTokenCount": 15
            }
        });
        let (content, usage) = adapter().parse_response(&body);
        assert_eq!(content, "hi");
        assert_eq!(usage.total_tokens, 30);
        assert_eq!(usage.cache_read_input_tokens, 15);
    }

    #[test]
    fn empty_candidates_degrade_to_empty_content() {
        let (content, usage) = adapter().parse_response(&serde_json::json!({}));
        assert_eq!(content, "");
        assert_eq!(usage, TokenUsage::default());
    }
}
