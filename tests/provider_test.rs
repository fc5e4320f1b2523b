//! HTTP adapter tests against a wiremock server.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use verbatim::providers::HttpProvider;
use verbatim::{
    GenerationRequest, ProviderConfig, RetryPolicy, TextGateway, TextProvider, TimeoutConfig,
    Verbatim, VerbatimError, WireShape,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> GenerationRequest {
    GenerationRequest::new("hello").max_tokens(50).temperature(0.2)
}

fn provider(config: ProviderConfig) -> HttpProvider {
    HttpProvider::new(config, Client::new())
}

fn gemini_ok(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

// =========================================================================
// Auth placement and payloads
// =========================================================================

#[tokio::test]
async fn gemini_sends_key_in_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "maxOutputTokens": 50 }
        })))
        .respond_with(gemini_ok("hola"))
        .expect(1)
        .mount(&server)
        .await;

    let gemini = provider(
        ProviderConfig::gemini(Some("g-key".into())).endpoint(format!("{}/gemini", server.uri())),
    );

    assert_eq!(gemini.generate(&request()).await.unwrap(), "hola");
}

#[tokio::test]
async fn openai_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer o-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "hi there" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let openai = provider(
        ProviderConfig::openai(Some("o-key".into()))
            .endpoint(format!("{}/v1/chat/completions", server.uri())),
    );

    assert_eq!(openai.generate(&request()).await.unwrap(), "hi there");
}

#[tokio::test]
async fn anthropic_sends_key_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "a-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "max_tokens": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "claude says hi" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let anthropic = provider(
        ProviderConfig::anthropic(Some("a-key".into()))
            .endpoint(format!("{}/v1/messages", server.uri())),
    );

    assert_eq!(
        anthropic.generate(&request()).await.unwrap(),
        "claude says hi"
    );
}

// =========================================================================
// Status classification
// =========================================================================

async fn classify(status: u16, body: serde_json::Value) -> VerbatimError {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    let openai = provider(ProviderConfig::openai(Some("o-key".into())).endpoint(server.uri()));
    openai.generate(&request()).await.unwrap_err()
}

#[tokio::test]
async fn server_error_status_is_server_class() {
    let err = classify(503, json!({ "error": { "message": "overloaded" } })).await;
    assert!(matches!(
        err,
        VerbatimError::Server { status: 503, ref message } if message == "overloaded"
    ));
    assert!(err.is_transient());
}

#[tokio::test]
async fn client_error_status_is_client_class() {
    let err = classify(400, json!({ "error": { "message": "bad temperature" } })).await;
    assert!(matches!(
        err,
        VerbatimError::Client { status: Some(400), ref message } if message == "bad temperature"
    ));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn success_without_expected_shape_is_client_error() {
    let err = classify(200, json!({ "unexpected": true })).await;
    assert!(matches!(err, VerbatimError::Client { status: Some(200), .. }));
}

#[tokio::test]
async fn non_json_success_body_is_client_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let gemini = provider(ProviderConfig::gemini(Some("g-key".into())).endpoint(server.uri()));

    let err = gemini.generate(&request()).await.unwrap_err();

    assert!(matches!(err, VerbatimError::Client { .. }));
}

#[tokio::test]
async fn unreachable_host_is_transport_error_without_key() {
    let gemini = provider(
        ProviderConfig::gemini(Some("secret-key".into())).endpoint("http://127.0.0.1:1/gemini"),
    );

    let err = gemini.generate(&request()).await.unwrap_err();

    assert!(matches!(err, VerbatimError::Transport(_)));
    assert!(!err.to_string().contains("secret-key"));
}

#[test]
fn custom_config_keeps_shape() {
    let config = ProviderConfig::new("proxy", WireShape::OpenAi, "http://localhost:9999/v1")
        .model("local-model")
        .api_key(Some("k".into()));
    let provider = provider(config);
    assert_eq!(provider.name(), "proxy");
    assert_eq!(provider.config().shape, WireShape::OpenAi);
    assert!(provider.has_credential());
}

// =========================================================================
// Through the gateway
// =========================================================================

#[tokio::test]
async fn gateway_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(gemini_ok("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Verbatim::builder()
        .provider(ProviderConfig::gemini(Some("g-key".into())).endpoint(server.uri()))
        .retry(RetryPolicy::new().base_delay(Duration::from_millis(10)))
        .build()
        .unwrap();

    let text = gateway.generate(&request()).await.unwrap();
    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn gateway_cache_avoids_second_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_ok("cached"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Verbatim::builder()
        .provider(ProviderConfig::gemini(Some("g-key".into())).endpoint(server.uri()))
        .build()
        .unwrap();

    assert_eq!(gateway.generate(&request()).await.unwrap(), "cached");
    assert_eq!(gateway.generate(&request()).await.unwrap(), "cached");
}

#[tokio::test]
async fn gateway_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "invalid key" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Verbatim::builder()
        .provider(ProviderConfig::anthropic(Some("bad".into())).endpoint(server.uri()))
        .build()
        .unwrap();

    let err = gateway.generate(&request()).await.unwrap_err();
    assert!(matches!(err, VerbatimError::Client { status: Some(401), .. }));
}

#[tokio::test]
async fn gateway_request_timeout_is_retried_as_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_ok("too late").set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Verbatim::builder()
        .provider(ProviderConfig::gemini(Some("g-key".into())).endpoint(server.uri()))
        .timeouts(TimeoutConfig::new().request(Duration::from_millis(100)))
        .retry(
            RetryPolicy::new()
                .max_attempts(2)
                .base_delay(Duration::from_millis(10)),
        )
        .build()
        .unwrap();

    let err = gateway.generate(&request()).await.unwrap_err();

    match err {
        VerbatimError::GatewayTimeout { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, VerbatimError::Transport(_)), "{last:?}");
        }
        other => panic!("expected GatewayTimeout, got {other:?}"),
    }
}

#[test]
fn timeout_config_defaults_and_overrides() {
    let defaults = TimeoutConfig::default();
    assert_eq!(defaults.connect, Duration::from_secs(5));
    assert_eq!(defaults.request, Duration::from_secs(60));

    let custom = TimeoutConfig::new()
        .connect(Duration::from_secs(1))
        .request(Duration::from_secs(2));
    assert_eq!(custom.connect, Duration::from_secs(1));
    assert_eq!(custom.request, Duration::from_secs(2));
}
