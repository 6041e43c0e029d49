mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use task_converter_rs::api::handlers::AppState;
use task_converter_rs::api::server::build_router;
use task_converter_rs::injector::Injector;
use task_converter_rs::ConverterConfig;
use tower::ServiceExt;

fn app() -> Router {
    app_with(common::test_config())
}

fn app_with(config: ConverterConfig) -> Router {
    let (converter, _, _) = common::converter_with_config(config, vec![]);
    build_router(AppState {
        converter: Arc::new(Mutex::new(converter)),
        injector: Arc::new(Injector::with_builtin_locators().unwrap()),
    })
}

fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> impl std::future::Future<Output = (StatusCode, Value)> + Send + 'static {
    let app = app.clone();
    let uri = uri.to_string();
    async move {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
    (status, value)
    }
}

#[tokio::test]
async fn convert_requires_credential_then_succeeds() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/convert", Some(json!({"text": "login broken"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "invalid_input");
    assert_eq!(body["message"], "Please enter your OpenAI API key first");

    let (status, _) = call(&app, Method::PUT, "/credential", Some(json!({"key": "sk-test"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/credential", None).await;
    assert_eq!(body["saved"], true);

    let (_, body) = call(&app, Method::POST, "/convert", Some(json!({"text": "login broken"}))).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["task"]["title"], "Bug: Login fails");

    let (_, body) = call(&app, Method::GET, "/history", None).await;
    assert_eq!(body["history"][0]["sourceText"], "login broken");

    let (status, body) = call(&app, Method::GET, "/result/copy/title", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Bug: Login fails".to_string()));
}

#[tokio::test]
async fn fill_returns_mutated_page() {
    let app = app();
    call(&app, Method::PUT, "/credential", Some(json!({"key": "sk-test"}))).await;
    call(&app, Method::POST, "/convert", Some(json!({"text": "login broken"}))).await;

    let page = json!({
        "elements": [
            {"tag": "form"},
            {"tag": "input", "attributes": {"name": "summary"}, "parent": 0}
        ]
    });
    let (_, body) = call(
        &app,
        Method::POST,
        "/fill",
        Some(json!({"tab_url": "https://acme.atlassian.net/jira", "page": page.clone()})),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task filled in Jira form!");
    assert_eq!(body["page"]["elements"][1]["value"], "Bug: Login fails");

    let (_, body) = call(
        &app,
        Method::POST,
        "/fill",
        Some(json!({"tab_url": "https://example.com", "page": page})),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_target_page");
}

#[tokio::test]
async fn clearing_history_and_result() {
    let app = app();
    call(&app, Method::PUT, "/credential", Some(json!({"key": "sk-test"}))).await;
    call(&app, Method::POST, "/convert", Some(json!({"text": "a"}))).await;

    let (status, _) = call(&app, Method::DELETE, "/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/history", None).await;
    assert_eq!(body["history"], json!([]));

    let (_, body) = call(&app, Method::GET, "/result", None).await;
    assert_eq!(body["result"]["sourceText"], "a");
    call(&app, Method::DELETE, "/result", None).await;
    let (_, body) = call(&app, Method::GET, "/result", None).await;
    assert_eq!(body["result"], Value::Null);

    let (status, body) = call(&app, Method::GET, "/result/copy/title", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn fill_rejects_page_with_parent_cycle() {
    let app = app();
    call(&app, Method::PUT, "/credential", Some(json!({"key": "sk-test"}))).await;
    call(&app, Method::POST, "/convert", Some(json!({"text": "login broken"}))).await;

    let page = json!({"elements": [{"tag": "input", "attributes": {"name": "summary"}, "parent": 0}]});
    let (status, body) = call(
        &app,
        Method::POST,
        "/fill",
        Some(json!({"tab_url": "https://acme.atlassian.net/jira", "page": page})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_page");

    let (status, body) = call(&app, Method::GET, "/credential", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn other_routes_stay_responsive_during_ready_delay() {
    let app = app_with(ConverterConfig {
        ready_delay: Duration::from_millis(800),
        ..common::test_config()
    });
    call(&app, Method::PUT, "/credential", Some(json!({"key": "sk-test"}))).await;
    call(&app, Method::POST, "/convert", Some(json!({"text": "login broken"}))).await;

    let fill_app = app.clone();
    let fill = tokio::spawn(async move {
        let page = json!({"elements": [{"tag": "input", "attributes": {"name": "summary"}}]});
        call(
            &fill_app,
            Method::POST,
            "/fill",
            Some(json!({"tab_url": "https://acme.atlassian.net/jira", "page": page})),
        )
        .await
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    let started = Instant::now();
    let (status, _) = call(&app, Method::GET, "/result", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(500));

    let (_, body) = fill.await.unwrap();
    assert_eq!(body["success"], true);
}
