//! Provider enumeration and composite model identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A distinct LLM vendor with its own wire protocol.
///
/// The string forms are the identifiers that appear in the vendor segment of
/// a composite `"vendor/model"` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    GoogleGemini,
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    AwsBedrock,
    Together,
    Groq,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// All supported providers, in catalog order.
    pub const ALL: [Provider; 8] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::GoogleGemini,
        Provider::AwsBedrock,
        Provider::Together,
        Provider::Groq,
        Provider::OpenRouter,
        Provider::AzureOpenAi,
    ];

    /// The wire identifier used in composite model identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::GoogleGemini => "google-gemini",
            Provider::AzureOpenAi => "azure-openai",
            Provider::AwsBedrock => "aws-bedrock",
            Provider::Together => "together",
            Provider::Groq => "groq",
            Provider::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google-gemini" => Ok(Provider::GoogleGemini),
            "azure-openai" => Ok(Provider::AzureOpenAi),
            "aws-bedrock" => Ok(Provider::AwsBedrock),
            "together" => Ok(Provider::Together),
            "groq" => Ok(Provider::Groq),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }
}

/// A parsed `"vendor/model"` identifier.
///
/// The split happens on the *first* slash: model names routinely contain
/// slashes themselves (`together/meta-llama/Llama-3-70b-chat-hf`). The model
/// segment is passed through to the vendor opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifier {
    pub provider: Provider,
    pub model: String,
}

impl ModelIdentifier {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Parse a composite identifier.
    ///
    /// Fails with [`Error::MissingModel`] when there is no model segment and
    /// with [`Error::UnsupportedProvider`] when the vendor segment is not a
    /// known provider.
    pub fn parse(identifier: &str) -> Result<Self, Error> {
        let (vendor, model) = identifier
            .split_once('/')
            .ok_or_else(|| Error::MissingModel(identifier.to_string()))?;
        let provider = vendor.parse::<Provider>()?;
        if model.is_empty() {
            return Err(Error::MissingModel(identifier.to_string()));
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
