//! Context cache lifecycle against a stubbed Gemini endpoint: reuse within
//! the TTL, re-creation after expiry, and the permanent per-model opt-out
//! with transparent fallback to the uncached path.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt_relay::{PromptRequest, Provider, RelayClient, RetryPolicy};

const MODEL: &str = "google-gemini/gemini-1.5-pro-002";

fn cached_request() -> PromptRequest {
    PromptRequest::new("fallback prompt")
        .with_prompt_parts("a very large shared context", "what changed?")
}

fn client_for(server: &MockServer, ttl: Duration) -> RelayClient {
    std::env::set_var("GEMINI_API_KEY", "gm-test");
    RelayClient::builder()
        .base_url_override(Provider::GoogleGemini, server.uri())
        .cache_ttl(ttl)
        .retry_policy(
            RetryPolicy::default()
                .with_initial_delay(Duration::from_millis(2))
                .without_jitter(),
        )
        .build()
        .unwrap()
}

fn generation_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": "cached answer" }], "role": "model" } }],
        "usageMetadata": {
            "promptTokenCount": 100,
            "candidatesTokenCount": 5,
            "totalTokenCount": 105,
            "cachedContentTokenCount": 90
        }
    }))
}

#[tokio::test]
async fn identical_calls_within_the_ttl_create_the_cache_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cachedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "cachedContents/fixture",
            "usageMetadata": { "totalTokenCount": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro-002:generateContent"))
        .and(body_partial_json(json!({ "cachedContent": "cachedContents/fixture" })))
        .respond_with(generation_response())
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(60));

    let first = client.generate(MODEL, &cached_request()).await.unwrap();
    assert_eq!(first.content, "cached answer");
    assert_eq!(first.token_usage.cache_creation_input_tokens, 42);
    assert_eq!(first.token_usage.cache_read_input_tokens, 90);
    assert_eq!(first.token_usage.total_tokens, 105);

    let second = client.generate(MODEL, &cached_request()).await.unwrap();
    assert_eq!(second.token_usage.cache_creation_input_tokens, 0);

    let stats = client.cache_stats();
    assert_eq!(stats.creations, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn a_call_after_expiry_creates_a_fresh_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cachedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "cachedContents/fixture",
            "usageMetadata": { "totalTokenCount": 42 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro-002:generateContent"))
        .respond_with(generation_response())
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::ZERO);

    client.generate(MODEL, &cached_request()).await.unwrap();
    let renewed = client.generate(MODEL, &cached_request()).await.unwrap();
    assert_eq!(renewed.token_usage.cache_creation_input_tokens, 42);
    assert_eq!(client.cache_stats().creations, 2);
}

#[tokio::test]
async fn failed_creation_opts_the_model_out_permanently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cachedContents"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "CachedContent is not supported for this model", "status": "INVALID_ARGUMENT" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Both generations land on the uncached route.
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro-002:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "plain answer" }], "role": "model" } }],
            "usageMetadata": {
                "promptTokenCount": 200,
                "candidatesTokenCount": 5,
                "totalTokenCount": 205
            }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(60));

    // First call: creation fails, falls back, still succeeds.
    let first = client.generate(MODEL, &cached_request()).await.unwrap();
    assert_eq!(first.content, "plain answer");
    assert_eq!(first.token_usage.cache_creation_input_tokens, 0);

    // Second call: no creation attempt at all (the mock's expect(1) holds).
    let second = client.generate(MODEL, &cached_request()).await.unwrap();
    assert_eq!(second.content, "plain answer");

    assert_eq!(client.cache_stats().opt_outs, 1);
    assert_eq!(client.cache_stats().creations, 0);
}

#[tokio::test]
async fn requests_without_a_split_skip_the_cache_entirely() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cachedContents"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-001:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "direct" }], "role": "model" } }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(60));
    let result = client
        .generate("google-gemini/gemini-2.0-flash-001", &PromptRequest::new("2+2"))
        .await
        .unwrap();
    assert_eq!(result.content, "direct");
    assert_eq!(client.cache_stats().misses, 0);
}

#[tokio::test]
async fn cached_generation_failure_falls_back_and_opts_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cachedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "cachedContents/doomed",
            "usageMetadata": { "totalTokenCount": 10 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Generation against the handle is rejected; the plain call succeeds.
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-002:generateContent"))
        .and(body_partial_json(json!({ "cachedContent": "cachedContents/doomed" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "cachedContent expired", "status": "INVALID_ARGUMENT" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-002:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "fallback answer" }], "role": "model" } }],
            "usageMetadata": { "promptTokenCount": 7, "candidatesTokenCount": 2, "totalTokenCount": 9 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(60));
    let result = client
        .generate("google-gemini/gemini-1.5-flash-002", &cached_request())
        .await
        .unwrap();
    assert_eq!(result.content, "fallback answer");
    assert_eq!(client.cache_stats().opt_outs, 1);
}
