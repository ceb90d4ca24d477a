//! OpenAI chat-completions adapter and its compatible family.
//!
//! Together, Groq and OpenRouter expose the same wire dialect behind their
//! own base URLs and credentials, so they are constructed as parameterized
//! instances of this adapter. OpenRouter fronts many upstream vendors behind
//! one response type and therefore normalizes usage through the ordered
//! shape probe; the others map the OpenAI usage shape directly.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config;
use crate::types::{normalize_usage, PromptRequest, Provider, TokenUsage};
use crate::Result;

use super::{text_at, u64_at, AdapterContext, ProviderAdapter, WireRequest};

pub struct OpenAiCompatibleAdapter {
    ctx: AdapterContext,
    provider: Provider,
    base_url: String,
    api_key_name: &'static str,
    probe_usage: bool,
}

impl OpenAiCompatibleAdapter {
    pub fn openai(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            provider: Provider::OpenAi,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key_name: "OPENAI_API_KEY",
            probe_usage: false,
        }
    }

    pub fn together(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            provider: Provider::Together,
            base_url: base_url.unwrap_or_else(|| "https://api.together.xyz/v1".to_string()),
            api_key_name: "TOGETHER_API_KEY",
            probe_usage: false,
        }
    }

    pub fn groq(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            provider: Provider::Groq,
            base_url: base_url.unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            api_key_name: "GROQ_API_KEY",
            probe_usage: false,
        }
    }

    pub fn openrouter(ctx: AdapterContext, base_url: Option<String>) -> Self {
        Self {
            ctx,
            provider: Provider::OpenRouter,
            base_url: base_url.unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            api_key_name: "OPENROUTER_API_KEY",
            probe_usage: true,
        }
    }
}

/// Reasoning model variants reject sampling parameters outright.
pub(crate) fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1") || model.starts_with("o3")
}

/// Build a chat-completions request body from the canonical request.
///
/// The system prompt becomes a leading `system` message. Images merge into
/// the user turn as data-URI blocks. For reasoning models the sampling
/// parameters (temperature, top_p, penalties) are omitted entirely while
/// `max_tokens` and the prompt still go out.
pub(crate) fn chat_completion_body(model: &str, request: &PromptRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system_prompt) = &request.system_prompt {
        messages.push(json!({ "role": "system", "content": system_prompt }));
    }

    let user_content = if request.images.is_empty() {
        Value::String(request.prompt.clone())
    } else {
        let mut parts = vec![json!({ "type": "text", "text": request.prompt })];
        parts.extend(request.images.iter().map(|image| {
            json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", image.mime_type, image.base64_data)
                }
            })
        }));
        Value::Array(parts)
    };
    messages.push(json!({ "role": "user", "content": user_content }));

    let mut body = json!({
        "model": model,
        "messages": messages,
    });

    let generation = &request.generation_config;
    if let Some(max_tokens) = generation.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if !is_reasoning_model(model) {
        body["temperature"] = json!(generation.temperature);
        if let Some(top_p) = generation.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(frequency_penalty) = generation.frequency_penalty {
            body["frequency_penalty"] = json!(frequency_penalty);
        }
        if let Some(presence_penalty) = generation.presence_penalty {
            body["presence_penalty"] = json!(presence_penalty);
        }
    }
    body
}

/// Normalize a chat-completions response: first choice text plus the OpenAI
/// usage shape, where the reported total is authoritative and cached prompt
/// tokens count as cache reads.
pub(crate) fn parse_chat_completion(body: &Value) -> (String, TokenUsage) {
    let content = text_at(body, "/choices/0/message/content").to_string();
    let usage = body.get("usage").map_or_else(TokenUsage::default, |usage| {
        TokenUsage::from_counts(
            u64_at(usage, "/prompt_tokens"),
            u64_at(usage, "/completion_tokens"),
            usage.pointer("/total_tokens").and_then(Value::as_u64),
        )
        .with_cache_read(u64_at(usage, "/prompt_tokens_details/cached_tokens"))
    });
    (content, usage)
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    fn build_request(&self, model: &str, request: &PromptRequest) -> Result<WireRequest> {
        let api_key = config::require(self.provider.as_str(), self.api_key_name)?;
        Ok(WireRequest {
            url: format!("{}/chat/completions", self.base_url),
            headers: vec![("authorization".to_string(), format!("Bearer {api_key}"))],
            body: chat_completion_body(model, request),
        })
    }

    fn parse_response(&self, body: &Value) -> (String, TokenUsage) {
        if self.probe_usage {
            let content = text_at(body, "/choices/0/message/content").to_string();
            (content, normalize_usage(body))
        } else {
            parse_chat_completion(body)
        }
    }
}
