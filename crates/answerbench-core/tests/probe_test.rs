//! Tests for the connection probe classification rules.

mod support;

use answerbench_core::probe::probe;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use support::{test_config, StubServer};

#[tokio::test(flavor = "multi_thread")]
async fn json_answer_is_reachable_with_preview() {
    let app = Router::new().route(
        "/ask",
        post(|| async { axum::Json(serde_json::json!({"answer": "pong"})) }),
    );
    let server = StubServer::start(app).await;
    let config = test_config(&server.base_url(), &server.base_url());

    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(probed.reachable);
    assert!(probed.message.contains("pong"), "got: {}", probed.message);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_2xx_status_is_unreachable() {
    let app = Router::new().route(
        "/ask",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let server = StubServer::start(app).await;
    let config = test_config(&server.base_url(), &server.base_url());

    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(!probed.reachable);
    assert!(probed.message.contains("500"), "got: {}", probed.message);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_body_is_unreachable_with_explicit_message() {
    let app = Router::new().route("/ask", post(|| async { "" }));
    let server = StubServer::start(app).await;
    let config = test_config(&server.base_url(), &server.base_url());

    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(!probed.reachable);
    assert!(
        probed.message.contains("empty body"),
        "got: {}",
        probed.message
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_body_is_treated_as_raw_text() {
    let app = Router::new().route("/ask", post(|| async { "plain text pong" }));
    let server = StubServer::start(app).await;
    let config = test_config(&server.base_url(), &server.base_url());

    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(probed.reachable);
    assert!(probed.message.contains("plain text pong"));
}

#[tokio::test(flavor = "multi_thread")]
async fn long_answers_are_truncated_with_ellipsis() {
    let long = "x".repeat(200);
    let app = Router::new().route(
        "/ask",
        post(move || async move { axum::Json(serde_json::json!({"answer": long})) }),
    );
    let server = StubServer::start(app).await;
    let config = test_config(&server.base_url(), &server.base_url());

    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(probed.reachable);
    assert!(probed.message.ends_with("..."));
}

#[tokio::test(flavor = "multi_thread")]
async fn unroutable_endpoint_is_unreachable() {
    // Nothing listens here; the connect fails outright.
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9");
    let probed = probe(&config.build_client().unwrap(), &config).await;
    assert!(!probed.reachable);
    assert!(probed.message.contains("request failed"));
}
