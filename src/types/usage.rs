//! Canonical usage accounting and the invocation result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical token accounting, normalized from per-vendor usage payloads.
///
/// `total_tokens` equals `input_tokens + output_tokens` unless the vendor
/// reports a total directly, in which case the vendor's value is
/// authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
}

impl TokenUsage {
    /// Build a usage record, computing the total when the vendor did not
    /// report one.
    pub fn from_counts(input_tokens: u64, output_tokens: u64, total_tokens: Option<u64>) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: total_tokens.unwrap_or(input_tokens + output_tokens),
            cache_read_input_tokens: 0,
            cache_creation_input_tokens: 0,
        }
    }

    pub fn with_cache_read(mut self, tokens: u64) -> Self {
        self.cache_read_input_tokens = tokens;
        self
    }

    pub fn with_cache_creation(mut self, tokens: u64) -> Self {
        self.cache_creation_input_tokens = tokens;
        self
    }
}

/// The canonical result returned to the caller regardless of vendor.
///
/// `duration_millis` measures only the network call(s) actually performed —
/// the last retry attempt, excluding client-side serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub content: String,
    pub token_usage: TokenUsage,
    pub duration_millis: u64,
}

fn probe(value: &Value, input: &str, output: &str, total: &str) -> Option<TokenUsage> {
    let input_tokens = value.get(input)?.as_u64()?;
    let output_tokens = value.get(output).and_then(Value::as_u64).unwrap_or(0);
    let total_tokens = value.get(total).and_then(Value::as_u64);
    Some(TokenUsage::from_counts(
        input_tokens,
        output_tokens,
        total_tokens,
    ))
}

/// Normalize a usage payload whose shape is not known up front.
///
/// Some aggregating return types (OpenRouter responses, shared client
/// wrappers) carry usage in one of several vendor dialects. The shapes are
/// probed in a fixed priority order and the first match wins:
///
/// 1. the canonical camel-case shape (`inputTokens`/`outputTokens`),
/// 2. a `usage_metadata` object (`input_tokens`/`output_tokens`),
/// 3. a camel-case `tokenUsage` object (`promptTokens`/`completionTokens`),
/// 4. a snake-case `token_usage` object (`prompt_tokens`/`completion_tokens`),
/// 5. a `usage` object in either the OpenAI or the Anthropic dialect.
///
/// When nothing matches, the result is all zeros. Purpose-built adapters map
/// their own vendor's shape directly and never go through this probe.
pub fn normalize_usage(value: &Value) -> TokenUsage {
    if let Some(canonical) = probe(value, "inputTokens", "outputTokens", "totalTokens") {
        return canonical
            .with_cache_read(
                value
                    .get("cacheReadInputTokens")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
            )
            .with_cache_creation(
                value
                    .get("cacheCreationInputTokens")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
            );
    }
    if let Some(metadata) = value.get("usage_metadata") {
        if let Some(usage) = probe(metadata, "input_tokens", "output_tokens", "total_tokens") {
            return usage;
        }
    }
    if let Some(camel) = value.get("tokenUsage") {
        if let Some(usage) = probe(camel, "promptTokens", "completionTokens", "totalTokens") {
            return usage;
        }
    }
    if let Some(snake) = value.get("token_usage") {
        if let Some(usage) = probe(snake, "prompt_tokens", "completion_tokens", "total_tokens") {
            return usage;
        }
    }
    if let Some(raw) = value.get("usage") {
        if let Some(usage) = probe(raw, "prompt_tokens", "completion_tokens", "total_tokens") {
            return usage;
        }
        if let Some(usage) = probe(raw, "input_tokens", "output_tokens", "total_tokens") {
            return usage;
        }
    }
    TokenUsage::default()
}
