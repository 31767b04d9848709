//! Connection probe for the system under test.
//!
//! Sends one synthetic request and classifies the outcome for display. The
//! probe never raises past its own boundary: every failure mode is folded
//! into a reachable/unreachable flag plus a message.

use crate::config::EvalConfig;
use crate::extract;
use crate::sut;
use crate::types::truncate_preview;
use serde_json::Value;
use tracing::debug;

/// Question sent by the probe. No real answer is required; any response body
/// proves the endpoint is alive and parseable.
const PROBE_QUESTION: &str = "ping";

/// Characters of extracted text shown in the probe message.
const PREVIEW_CHARS: usize = 80;

/// Outcome of a connection probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probed {
    pub reachable: bool,
    pub message: String,
}

impl Probed {
    fn unreachable(message: impl Into<String>) -> Self {
        Self {
            reachable: false,
            message: message.into(),
        }
    }

    fn reachable(message: impl Into<String>) -> Self {
        Self {
            reachable: true,
            message: message.into(),
        }
    }
}

/// Probe the configured SUT endpoint.
pub async fn probe(client: &reqwest::Client, config: &EvalConfig) -> Probed {
    let endpoint = config.sut.endpoint();
    debug!(%endpoint, "probing SUT");

    let response = match sut::build_request(client, config, PROBE_QUESTION).send().await {
        Ok(resp) => resp,
        Err(err) => return Probed::unreachable(format!("request failed: {err}")),
    };

    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        return Probed::unreachable(format!("HTTP {} {}", status.as_u16(), reason));
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return Probed::unreachable(format!("failed to read body: {err}")),
    };

    if body.trim().is_empty() {
        // A 2xx with nothing in it points at a misconfigured SUT, not a
        // network problem; the message says so explicitly.
        return Probed::unreachable("endpoint answered with an empty body".to_string());
    }

    // Non-JSON bodies are treated as a raw string payload, not an error.
    let answer = match serde_json::from_str::<Value>(&body) {
        Ok(value) => extract::extract(&value),
        Err(_) => body,
    };

    Probed::reachable(format!(
        "endpoint answered: {}",
        truncate_preview(&answer, PREVIEW_CHARS)
    ))
}
