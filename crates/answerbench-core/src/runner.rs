//! Single-case execution: call the SUT, extract the answer, grade it, and
//! assemble an [`EvaluationResult`].
//!
//! This is the one code path used by both batch execution and isolated
//! re-evaluation. It is idempotent given identical SUT/judge responses.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::extract;
use crate::judge::JudgeClient;
use crate::sut;
use crate::types::{truncate_preview, EvaluationResult, TestCase};
use serde_json::Value;
use tracing::debug;

/// Characters of a malformed body quoted in the error message.
const EXCERPT_CHARS: usize = 200;

/// Drive one test case end-to-end.
///
/// Fails with the error tagged with the case's identifier so batch failures
/// are attributable. Unlike the probe, an unparseable SUT body is fatal
/// here: batch results require structured data.
pub async fn run_case(
    client: &reqwest::Client,
    case: &TestCase,
    config: &EvalConfig,
) -> Result<EvaluationResult> {
    run_case_inner(client, case, config)
        .await
        .map_err(|e| e.for_case(case.id))
}

async fn run_case_inner(
    client: &reqwest::Client,
    case: &TestCase,
    config: &EvalConfig,
) -> Result<EvaluationResult> {
    debug!(case_id = case.id, "calling SUT");

    let response = sut::build_request(client, config, &case.question)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(EvalError::Transport {
            message: format!("SUT returned HTTP {}", status.as_u16()),
        });
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(EvalError::EmptyResponse);
    }

    let payload: Value = serde_json::from_str(&body).map_err(|_| EvalError::MalformedJson {
        excerpt: truncate_preview(&body, EXCERPT_CHARS),
    })?;

    let obtained = extract::extract(&payload);
    debug!(case_id = case.id, obtained = %truncate_preview(&obtained, 80), "answer extracted");

    let verdict = JudgeClient::new(client)
        .judge(&case.question, &case.expected, &obtained, config)
        .await?;

    // average_score is recomputed here from the five criterion scores; any
    // average the judge may have embedded in its reply is ignored.
    Ok(EvaluationResult::new(case, obtained, verdict))
}
