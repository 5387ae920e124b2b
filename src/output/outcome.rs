//! Run outcome evaluation and the end-of-run summary

use crate::config::ThresholdConfig;
use crate::state::CounterSnapshot;
use std::time::Duration;

/// Final verdict of a mirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    pub fn is_success(self) -> bool {
        self == Verdict::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Success => "success",
            Verdict::Failure => "failure",
        }
    }
}

/// Derives the verdict from the run counters alone
///
/// The run succeeds when strictly more than `min_processed_pages` pages were
/// written and at most `max_suppressed_exceptions` failures were contained.
///
/// # Examples
///
/// ```
/// use wiki_mirror::config::ThresholdConfig;
/// use wiki_mirror::{evaluate, CounterSnapshot, Verdict};
///
/// let counters = CounterSnapshot { processed_pages: 1001, suppressed_exceptions: 100 };
/// assert_eq!(evaluate(&counters, &ThresholdConfig::default()), Verdict::Success);
/// ```
pub fn evaluate(counters: &CounterSnapshot, thresholds: &ThresholdConfig) -> Verdict {
    if counters.processed_pages > thresholds.min_processed_pages
        && counters.suppressed_exceptions <= thresholds.max_suppressed_exceptions
    {
        Verdict::Success
    } else {
        Verdict::Failure
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub counters: CounterSnapshot,
    pub thresholds: ThresholdConfig,
    pub elapsed: Duration,
    pub verdict: Verdict,
}

impl RunSummary {
    pub fn new(counters: CounterSnapshot, thresholds: ThresholdConfig, elapsed: Duration) -> Self {
        Self {
            verdict: evaluate(&counters, &thresholds),
            counters,
            thresholds,
            elapsed,
        }
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Pages processed: {}", summary.counters.processed_pages);
    println!(
        "Suppressed exceptions: {}",
        summary.counters.suppressed_exceptions
    );

    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.counters.processed_pages as f64 / secs
    } else {
        0.0
    };
    println!("Elapsed: {:.1}s ({:.2} pages/sec)", secs, rate);
    println!();

    if !summary.verdict.is_success() {
        if summary.counters.processed_pages <= summary.thresholds.min_processed_pages {
            println!(
                "Too few pages: expected more than {}",
                summary.thresholds.min_processed_pages
            );
        }
        if summary.counters.suppressed_exceptions > summary.thresholds.max_suppressed_exceptions {
            println!(
                "Too many failures: expected at most {}",
                summary.thresholds.max_suppressed_exceptions
            );
        }
    }

    println!("Result: {}", summary.verdict.as_str());
}
