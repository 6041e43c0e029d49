use serde_json::json;
use task_converter_rs::llm::{
    CompletionRequest, LLMResponse, Message, OpenAIAdapter, OpenAIConfig, ProviderAdapter, ProviderError,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CompletionRequest {
    CompletionRequest {
        api_key: "sk-test".to_string(),
        messages: vec![Message::system("be helpful"), Message::user("convert this")],
        model: "gpt-3.5-turbo".to_string(),
        max_tokens: 800,
        temperature: 0.7,
    }
}

// The blocking client has to be created and dropped off the async runtime.
async fn complete_against(url: String) -> Result<LLMResponse, ProviderError> {
    tokio::task::spawn_blocking(move || {
        let adapter = OpenAIAdapter::new(OpenAIConfig {
            api_url: url,
            ..OpenAIConfig::default()
        })?;
        adapter.complete(request())
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn sends_chat_completion_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 800,
            "messages": [
                {"role": "system", "content": "be helpful"},
                {"role": "user", "content": "convert this"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo-0125",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Title: Task: X\n"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = complete_against(format!("{}/v1/chat/completions", server.uri()))
        .await
        .unwrap();
    assert_eq!(resp.content, "Title: Task: X");
    assert_eq!(resp.model.as_deref(), Some("gpt-3.5-turbo-0125"));
}

#[tokio::test]
async fn surfaces_provider_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided: sk-test.", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = complete_against(server.uri()).await.unwrap_err();
    match err {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided: sk-test.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_service_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = complete_against(server.uri()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_network_failure() {
    // Nothing listens on port 9 locally.
    let err = complete_against("http://127.0.0.1:9/v1/chat/completions".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Network(_)));
}
