//! Indicatif-based progress display for the CLI.
//!
//! The batch is strictly sequential, so a single bar is enough. Pass/fail
//! counts are kept in atomics and rendered into the bar message after every
//! case.

use answerbench_core::reporter::{ProgressEvent, ProgressReporter};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct ProgressDisplay {
    bar: Mutex<Option<ProgressBar>>,
    passed: AtomicU64,
    failed: AtomicU64,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            passed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    fn counters_message(&self) -> String {
        format!(
            "{} {} {} {}",
            style("✓").green(),
            style(self.passed.load(Ordering::Relaxed)).green().bold(),
            style("✗").red(),
            style(self.failed.load(Ordering::Relaxed)).red().bold(),
        )
    }
}

impl ProgressReporter for ProgressDisplay {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { total } => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .expect("valid template")
                    .progress_chars("█▓▒░  "),
                );
                bar.enable_steady_tick(std::time::Duration::from_millis(100));
                *self.bar.lock() = Some(bar);
            }
            ProgressEvent::CaseStarted {
                current,
                total,
                question_preview,
            } => {
                if let Some(bar) = self.bar.lock().as_ref() {
                    bar.set_message(format!(
                        "{} {}",
                        self.counters_message(),
                        style(format!("[{current}/{total}] {question_preview}")).dim()
                    ));
                }
            }
            ProgressEvent::CaseCompleted { passed, .. } => {
                if passed {
                    self.passed.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                }
                if let Some(bar) = self.bar.lock().as_ref() {
                    bar.inc(1);
                    bar.set_message(self.counters_message());
                }
            }
            ProgressEvent::BatchCompleted { .. } => {
                if let Some(bar) = self.bar.lock().take() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}
