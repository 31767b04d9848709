//! LLM judge client: prompt construction, chat-completion call, and
//! hardened parsing of the reply into a [`CriteriaVerdict`].
//!
//! The judge's reply is free text that is expected to be JSON. It is treated
//! as an untrusted-parse boundary: decoded into a loose document first, then
//! every required field is validated explicitly before a verdict is built.

use crate::config::{CommentVerbosity, EvalConfig};
use crate::error::{EvalError, Result};
use crate::types::{CriteriaVerdict, Criterion, CriterionScore, Verdict};
use serde_json::Value;
use tracing::debug;

/// Judge client bound to the shared HTTP client.
pub struct JudgeClient<'a> {
    client: &'a reqwest::Client,
}

impl<'a> JudgeClient<'a> {
    pub fn new(client: &'a reqwest::Client) -> Self {
        Self { client }
    }

    /// Grade one obtained answer against its expected answer.
    pub async fn judge(
        &self,
        question: &str,
        expected: &str,
        obtained: &str,
        config: &EvalConfig,
    ) -> Result<CriteriaVerdict> {
        let prompt = build_prompt(question, expected, obtained, config.judge.verbosity);

        let body = serde_json::json!({
            "model": config.judge.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": config.judge.temperature,
            "max_tokens": config.judge.verbosity.max_tokens(),
        });

        let url = format!(
            "{}/v1/chat/completions",
            config.judge.base_url.trim_end_matches('/')
        );
        debug!(model = %config.judge.model, %url, "calling judge");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.judge.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EvalError::Transport {
                message: format!("judge call failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvalError::Transport {
                message: format!("judge returned HTTP {}", status.as_u16()),
            });
        }

        let envelope: Value = response.json().await.map_err(|e| EvalError::Transport {
            message: format!("failed to read judge response: {e}"),
        })?;

        let content = envelope
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| EvalError::JudgeProtocol {
                raw: envelope.to_string(),
            })?;

        parse_verdict(content)
    }
}

/// Build the single instruction block sent to the judge.
///
/// The prompt restricts the judge to comparing the obtained answer against
/// the expected answer only, and mandates one JSON object with fixed keys.
fn build_prompt(
    question: &str,
    expected: &str,
    obtained: &str,
    verbosity: CommentVerbosity,
) -> String {
    let mut criteria_block = String::new();
    for criterion in Criterion::ALL {
        criteria_block.push_str(&format!("- {}: {}\n", criterion.key(), criterion.description()));
    }

    let comment_instruction = match verbosity {
        CommentVerbosity::Brief => "Keep each comment to one short sentence.",
        CommentVerbosity::Detailed => {
            "Write a detailed comment of two to four sentences for each criterion."
        }
    };

    let mut keys = String::new();
    for criterion in Criterion::ALL {
        keys.push_str(&format!(
            "\"{key}_score\": <number>, \"{key}_comment\": \"...\", ",
            key = criterion.key()
        ));
    }

    format!(
        "You are grading the output of a question-answering system.\n\
         Compare the obtained answer against the expected answer only. Do not \
         use outside world knowledge and do not fact-check beyond that \
         comparison.\n\n\
         Question: {question}\n\
         Expected answer: {expected}\n\
         Obtained answer: {obtained}\n\n\
         Score each criterion with a real number between 0.0 and 1.0:\n\
         {criteria_block}\n\
         {comment_instruction}\n\n\
         Reply with a single JSON object and nothing else, using exactly \
         these keys:\n\
         {{{keys}\"final_verdict\": \"PASS\" or \"FAIL\", \"final_comment\": \"...\"}}"
    )
}

/// Parse and validate the judge's reply text.
///
/// One parse attempt, no leniency: the trimmed text must be a JSON object.
/// Each criterion must carry a numeric `<key>_score` (clamped into [0,1]);
/// comments are optional and default to empty. `final_verdict` must read as
/// PASS or FAIL. Everything else is a protocol error carrying the raw text.
pub fn parse_verdict(raw: &str) -> Result<CriteriaVerdict> {
    let trimmed = raw.trim();
    let doc: Value = serde_json::from_str(trimmed).map_err(|_| EvalError::JudgeProtocol {
        raw: raw.to_string(),
    })?;

    let map = doc.as_object().ok_or_else(|| EvalError::JudgeProtocol {
        raw: raw.to_string(),
    })?;

    let mut scores = Vec::with_capacity(Criterion::ALL.len());
    for criterion in Criterion::ALL {
        let score = map
            .get(&format!("{}_score", criterion.key()))
            .and_then(Value::as_f64)
            .ok_or_else(|| EvalError::JudgeProtocol {
                raw: raw.to_string(),
            })?;
        let comment = map
            .get(&format!("{}_comment", criterion.key()))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        scores.push(CriterionScore {
            score: score.clamp(0.0, 1.0),
            comment,
        });
    }

    let final_verdict = map
        .get("final_verdict")
        .and_then(Value::as_str)
        .and_then(Verdict::parse)
        .ok_or_else(|| EvalError::JudgeProtocol {
            raw: raw.to_string(),
        })?;

    let final_comment = map
        .get("final_comment")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut scores = scores.into_iter();
    Ok(CriteriaVerdict {
        correctness: scores.next().expect("five scores"),
        coverage: scores.next().expect("five scores"),
        relevance: scores.next().expect("five scores"),
        faithfulness: scores.next().expect("five scores"),
        clarity: scores.next().expect("five scores"),
        final_verdict,
        final_comment,
    })
}
