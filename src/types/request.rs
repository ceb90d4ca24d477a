//! Canonical request types.

use serde::{Deserialize, Serialize};

/// A static/dynamic prompt split for vendors with server-side context caching.
///
/// The static part is the large reusable prefix; the dynamic part is the
/// per-call suffix. Both must be non-empty for the cached path to activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptParts {
    pub static_part: String,
    pub dynamic_part: String,
}

/// An image attached to the user turn.
///
/// No size validation happens here; vendors enforce their own limits and
/// reject oversized payloads with a provider error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub mime_type: String,
    pub base64_data: String,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64_data: base64_data.into(),
        }
    }
}

/// Sampling and length parameters, mapped per vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

/// The canonical "generate text from a prompt" request.
///
/// When `prompt_parts` carries a non-empty static and dynamic part,
/// caching-capable adapters use the split and ignore `prompt`; everywhere
/// else `prompt` is the sole user content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_parts: Option<PromptParts>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
    #[serde(default)]
    pub generation_config: GenerationConfig,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
            prompt_parts: None,
            images: Vec::new(),
            generation_config: GenerationConfig::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_prompt_parts(
        mut self,
        static_part: impl Into<String>,
        dynamic_part: impl Into<String>,
    ) -> Self {
        self.prompt_parts = Some(PromptParts {
            static_part: static_part.into(),
            dynamic_part: dynamic_part.into(),
        });
        self
    }

    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// The static/dynamic split, if both halves are usable.
    ///
    /// An empty half disables the split entirely and the adapter falls back
    /// to `prompt` as the sole user content.
    pub fn split_parts(&self) -> Option<(&str, &str)> {
        match &self.prompt_parts {
            Some(parts) if !parts.static_part.is_empty() && !parts.dynamic_part.is_empty() => {
                Some((&parts.static_part, &parts.dynamic_part))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_requires_both_halves() {
        let full = PromptRequest::new("fallback").with_prompt_parts("context", "question");
        assert_eq!(full.split_parts(), Some(("context", "question")));

        let half = PromptRequest::new("fallback").with_prompt_parts("", "question");
        assert_eq!(half.split_parts(), None);

        let none = PromptRequest::new("fallback");
        assert_eq!(none.split_parts(), None);
    }

    #[test]
    fn canonical_json_uses_camel_case() {
        let request = PromptRequest::new("2+2")
            .with_system_prompt("You are terse.")
            .with_generation_config(GenerationConfig {
                temperature: 0.0,
                max_tokens: Some(10),
                ..Default::default()
            });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemPrompt"], "You are terse.");
        assert_eq!(value["generationConfig"]["maxTokens"], 10);
        assert!(value.get("promptParts").is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let request: PromptRequest =
            serde_json::from_str(r#"{"prompt":"hello"}"#).unwrap();
        assert_eq!(request.prompt, "hello");
        assert!(request.images.is_empty());
        assert_eq!(request.generation_config.temperature, 0.0);
        assert_eq!(request.generation_config.max_tokens, None);
    }
}
