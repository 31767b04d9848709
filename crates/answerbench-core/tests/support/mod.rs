//! Shared stub servers and config builders for integration tests.
#![allow(dead_code)]

use answerbench_core::config::{EvalConfig, HttpMethod, JudgeSettings, SutTarget};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A stub HTTP server bound to an OS-assigned port.
pub struct StubServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Config pointing the SUT at `sut_base` and the judge at `judge_base`.
pub fn test_config(sut_base: &str, judge_base: &str) -> EvalConfig {
    EvalConfig {
        sut: SutTarget {
            base_url: sut_base.to_string(),
            path: "/ask".to_string(),
            method: HttpMethod::Post,
            headers: vec![],
        },
        judge: JudgeSettings {
            api_key: "test-key".to_string(),
            base_url: judge_base.to_string(),
            ..Default::default()
        },
        timeout_seconds: None,
    }
}

/// A judge reply body with all five criteria at the given scores.
pub fn judge_reply(scores: [f64; 5], verdict: &str) -> serde_json::Value {
    let keys = ["correctness", "coverage", "relevance", "faithfulness", "clarity"];
    let mut obj = serde_json::Map::new();
    for (key, score) in keys.iter().zip(scores) {
        obj.insert(format!("{key}_score"), score.into());
        obj.insert(format!("{key}_comment"), format!("{key} looks fine").into());
    }
    obj.insert("final_verdict".into(), verdict.into());
    obj.insert("final_comment".into(), "graded by stub".into());
    serde_json::Value::Object(obj)
}

/// Wrap judge reply content in a chat-completions envelope.
pub fn completion_envelope(content: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"content": content.to_string()}}]
    })
}
