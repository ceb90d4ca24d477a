//! # prompt-relay
//!
//! A normalization and resilience layer for text generation: one canonical
//! "generate text from a prompt" request, transparently routed to any of
//! several heterogeneous LLM vendor APIs, with consistent retry behavior,
//! optional vendor-side context caching, and a single canonical result
//! shape regardless of vendor.
//!
//! ## Overview
//!
//! A composite `"vendor/model"` identifier selects one of eight vendor
//! adapters (OpenAI, Anthropic, Google Gemini, Azure-hosted OpenAI, AWS
//! Bedrock, Together, Groq, OpenRouter). The adapter maps the canonical
//! request onto the vendor's wire format, invokes it through an
//! exponential-backoff retry executor that repeats only rate-limit-class
//! failures, and normalizes the vendor's usage payload into one canonical
//! [`TokenUsage`]. Vendors with server-side context caching can store a
//! large static prompt prefix once and reference it by handle on later
//! calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prompt_relay::{PromptRequest, RelayClient};
//!
//! #[tokio::main]
//! async fn main() -> prompt_relay::Result<()> {
//!     let client = RelayClient::new()?;
//!
//!     let request = PromptRequest::new("What is 2+2?")
//!         .with_system_prompt("Answer with the number only.");
//!     let result = client.generate("openai/gpt-4o", &request).await?;
//!
//!     println!("{} ({} tokens)", result.content, result.token_usage.total_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `RelayClient` facade and builder |
//! | [`registry`] | Provider lookup table, dispatch and the model catalog |
//! | [`providers`] | One adapter per vendor: wire format in, canonical result out |
//! | [`retry`] | Exponential-backoff executor for transient failures |
//! | [`cache`] | Vendor-side context cache handles, TTL and opt-out tracking |
//! | [`transport`] | Shared `reqwest` wrapper and HTTP status classification |
//! | [`types`] | Canonical request/result value types |

pub mod cache;
pub mod client;
pub mod providers;
pub mod registry;
pub mod retry;
pub mod transport;
pub mod types;

mod config;

/// Error type for the relay.
pub mod error;
pub use error::Error;

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the main surface for convenience.
pub use cache::{CacheConfig, CacheStats};
pub use client::{RelayClient, RelayClientBuilder};
pub use retry::RetryPolicy;
pub use types::{
    GenerationConfig, ImageAttachment, InvocationResult, ModelIdentifier, PromptParts,
    PromptRequest, Provider, TokenUsage,
};
