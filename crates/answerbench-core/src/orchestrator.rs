//! Batch orchestration: drive an ordered list of test cases through the
//! case runner, strictly sequentially, with all-or-nothing failure.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::probe::Probed;
use crate::reporter::{NullReporter, ProgressEvent, ProgressReporter};
use crate::runner;
use crate::types::{truncate_preview, EvaluationResult, TestCase, Verdict};
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters of the question shown in progress events.
const QUESTION_PREVIEW_CHARS: usize = 80;

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Runs batches of test cases and tracks the probe precondition.
///
/// Cases are processed strictly in input order, one at a time; no two SUT or
/// judge calls are ever in flight concurrently from the same run. Any case
/// failure aborts the whole batch and discards the results computed so far.
pub struct BatchOrchestrator {
    state: BatchState,
    probed: bool,
    reporter: Arc<dyn ProgressReporter>,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOrchestrator {
    pub fn new() -> Self {
        Self {
            state: BatchState::Idle,
            probed: false,
            reporter: Arc::new(NullReporter),
        }
    }

    /// Set a custom progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Record the outcome of a connection probe. A successful probe is a
    /// precondition for [`run_all`](Self::run_all).
    pub fn record_probe(&mut self, probed: &Probed) {
        self.probed = probed.reachable;
        if !probed.reachable {
            warn!(message = %probed.message, "probe recorded as unreachable");
        }
    }

    fn check_preconditions(&self, cases: &[TestCase], config: &EvalConfig) -> Result<()> {
        if cases.is_empty() {
            return Err(EvalError::Precondition(
                "no test cases to evaluate".to_string(),
            ));
        }
        if !self.probed {
            return Err(EvalError::Precondition(
                "connection has not been probed successfully".to_string(),
            ));
        }
        check_judge_credentials(config)?;
        Ok(())
    }

    /// Run every case in input order and return one result per case.
    ///
    /// Preconditions are checked before any network call. On the first case
    /// failure the batch aborts: the error (tagged with the case id)
    /// surfaces and results computed for earlier cases are discarded.
    pub async fn run_all(
        &mut self,
        cases: &[TestCase],
        config: &EvalConfig,
    ) -> Result<Vec<EvaluationResult>> {
        self.check_preconditions(cases, config)?;

        let client = config.build_client().map_err(|e| {
            EvalError::Precondition(format!("failed to build HTTP client: {e}"))
        })?;

        self.state = BatchState::Running;
        let total = cases.len() as u64;
        self.reporter.report(ProgressEvent::BatchStarted { total });

        let mut results = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            self.reporter.report(ProgressEvent::CaseStarted {
                current: index as u64 + 1,
                total,
                question_preview: truncate_preview(&case.question, QUESTION_PREVIEW_CHARS),
            });

            match runner::run_case(&client, case, config).await {
                Ok(result) => {
                    self.reporter.report(ProgressEvent::CaseCompleted {
                        case_id: result.case_id,
                        passed: result.verdict.final_verdict == Verdict::Pass,
                        average_score: result.average_score,
                    });
                    results.push(result);
                }
                Err(err) => {
                    // All-or-nothing: partial results are dropped here.
                    self.state = BatchState::Aborted;
                    return Err(err);
                }
            }
        }

        let passed = results
            .iter()
            .filter(|r| r.verdict.final_verdict == Verdict::Pass)
            .count() as u64;
        self.reporter.report(ProgressEvent::BatchCompleted {
            total,
            passed,
            failed: total - passed,
        });

        self.state = BatchState::Completed;
        debug!(total, passed, "batch completed");
        Ok(results)
    }
}

fn check_judge_credentials(config: &EvalConfig) -> Result<()> {
    if config.judge.api_key.trim().is_empty() {
        return Err(EvalError::Precondition(
            "judge credentials are not configured".to_string(),
        ));
    }
    Ok(())
}

/// Re-evaluate a single case against an existing results collection.
///
/// Replaces the entry sharing the case's identifier in place (preserving the
/// order of all other entries) or appends a new entry when none exists. Only
/// the judge-credential precondition applies; a prior probe is not required.
/// On failure the collection is left untouched.
pub async fn re_evaluate(
    results: &mut Vec<EvaluationResult>,
    case: &TestCase,
    config: &EvalConfig,
) -> Result<()> {
    check_judge_credentials(config)?;

    let client = config
        .build_client()
        .map_err(|e| EvalError::Precondition(format!("failed to build HTTP client: {e}")))?;

    let fresh = runner::run_case(&client, case, config).await?;

    match results.iter_mut().find(|r| r.case_id == case.id) {
        Some(existing) => *existing = fresh,
        None => results.push(fresh),
    }
    Ok(())
}
