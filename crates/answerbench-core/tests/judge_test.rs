//! Tests for the judge client against a stub chat-completions endpoint.

mod support;

use answerbench_core::config::CommentVerbosity;
use answerbench_core::error::EvalError;
use answerbench_core::judge::JudgeClient;
use answerbench_core::types::Verdict;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::{Arc, Mutex};
use support::{completion_envelope, judge_reply, test_config, StubServer};

#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<serde_json::Value>>>,
}

async fn capture_handler(
    State(state): State<Captured>,
    headers: axum::http::HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    if let Some(auth) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        *state.auth.lock().unwrap() = Some(auth.to_string());
    }
    *state.body.lock().unwrap() = Some(body);
    Json(completion_envelope(&judge_reply(
        [0.9, 0.8, 0.7, 0.6, 0.5],
        "PASS",
    )))
}

#[tokio::test(flavor = "multi_thread")]
async fn judge_parses_valid_reply_and_forwards_credentials() {
    let state = Captured::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(capture_handler))
        .with_state(state.clone());
    let server = StubServer::start(app).await;
    let config = test_config("http://unused", &server.base_url());

    let client = config.build_client().unwrap();
    let verdict = JudgeClient::new(&client)
        .judge("Capital of Spain?", "Madrid", "Madrid", &config)
        .await
        .unwrap();

    assert_eq!(verdict.final_verdict, Verdict::Pass);
    assert!((verdict.correctness.score - 0.9).abs() < 1e-9);
    assert!((verdict.clarity.score - 0.5).abs() < 1e-9);

    let auth = state.auth.lock().unwrap().clone();
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));

    let body = state.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(
        body["max_tokens"],
        serde_json::json!(CommentVerbosity::Brief.max_tokens())
    );
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Capital of Spain?"));
    assert!(prompt.contains("Madrid"));
    assert!(prompt.contains("Do not"), "prompt must forbid outside knowledge");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_content_is_a_protocol_error_with_raw_text() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(serde_json::json!({
                "choices": [{"message": {"content": "definitely not json"}}]
            }))
        }),
    );
    let server = StubServer::start(app).await;
    let config = test_config("http://unused", &server.base_url());

    let client = config.build_client().unwrap();
    let err = JudgeClient::new(&client)
        .judge("q", "e", "o", &config)
        .await
        .unwrap_err();

    match err {
        EvalError::JudgeProtocol { raw } => assert!(raw.contains("definitely not json")),
        other => panic!("expected JudgeProtocol, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_choices_is_a_protocol_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(serde_json::json!({"error": "overloaded"})) }),
    );
    let server = StubServer::start(app).await;
    let config = test_config("http://unused", &server.base_url());

    let client = config.build_client().unwrap();
    let err = JudgeClient::new(&client)
        .judge("q", "e", "o", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::JudgeProtocol { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_2xx_is_a_transport_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let server = StubServer::start(app).await;
    let config = test_config("http://unused", &server.base_url());

    let client = config.build_client().unwrap();
    let err = JudgeClient::new(&client)
        .judge("q", "e", "o", &config)
        .await
        .unwrap_err();

    match err {
        EvalError::Transport { message } => assert!(message.contains("503")),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn detailed_verbosity_raises_token_budget() {
    let state = Captured::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(capture_handler))
        .with_state(state.clone());
    let server = StubServer::start(app).await;
    let mut config = test_config("http://unused", &server.base_url());
    config.judge.verbosity = CommentVerbosity::Detailed;

    let client = config.build_client().unwrap();
    JudgeClient::new(&client)
        .judge("q", "e", "o", &config)
        .await
        .unwrap();

    let body = state.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["max_tokens"], 1200);
}
