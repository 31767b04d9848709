//! Progress reporting trait and types for batch execution.

use serde::{Deserialize, Serialize};

/// Events emitted during batch execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// Batch started with total case count.
    BatchStarted { total: u64 },
    /// Emitted before each case is processed. `current` counts from 1.
    CaseStarted {
        current: u64,
        total: u64,
        question_preview: String,
    },
    /// A case finished and its result was collected.
    CaseCompleted {
        case_id: u64,
        passed: bool,
        average_score: f64,
    },
    /// Batch finished.
    BatchCompleted {
        total: u64,
        passed: u64,
        failed: u64,
    },
}

/// Trait for progress reporters.
///
/// Implementors receive events during batch execution and can display
/// progress, log to file, etc.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// A no-op reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// A simple reporter that prints to stdout.
#[derive(Debug, Default)]
pub struct PrintReporter;

impl ProgressReporter for PrintReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { total } => {
                println!("Starting batch: {total} cases");
            }
            ProgressEvent::CaseStarted {
                current,
                total,
                question_preview,
            } => {
                println!("[{current}/{total}] {question_preview}");
            }
            ProgressEvent::CaseCompleted {
                case_id,
                passed,
                average_score,
            } => {
                let status = if passed { "PASS" } else { "FAIL" };
                println!("[{status}] case {case_id} (avg {average_score:.2})");
            }
            ProgressEvent::BatchCompleted {
                total,
                passed,
                failed,
            } => {
                println!("Batch completed: {passed}/{total} passed, {failed} failed");
            }
        }
    }
}
