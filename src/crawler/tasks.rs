//! Per-task failure containment
//!
//! Every unit of work spawned by the coordinator runs through [`contain`]: an
//! error is logged with its full source chain, counted, and turned into `None`
//! so it never crosses the task boundary.

use crate::state::Counters;
use crate::MirrorError;
use std::error::Error as _;
use std::future::Future;
use tokio::task::JoinError;

/// Runs `work`, capturing any error it returns
///
/// # Arguments
///
/// * `label` - Human-readable description of the work, used in the log line
/// * `counters` - Run counters; `suppressed_exceptions` grows by one on failure
/// * `work` - The fallible unit of work
///
/// # Returns
///
/// * `Some(T)` - The work succeeded
/// * `None` - The work failed; the failure has been logged and counted
pub async fn contain<T, F>(label: &str, counters: &Counters, work: F) -> Option<T>
where
    F: Future<Output = Result<T, MirrorError>>,
{
    match work.await {
        Ok(value) => Some(value),
        Err(error) => {
            record_failure(label, counters, &error);
            None
        }
    }
}

/// Logs and counts a task that panicked or was aborted
pub fn contain_join_error(counters: &Counters, error: JoinError) {
    // Aborted tasks only show up while the whole run is being torn down
    if error.is_cancelled() {
        return;
    }
    let error = MirrorError::Join(error);
    record_failure("task", counters, &error);
}

fn record_failure(label: &str, counters: &Counters, error: &MirrorError) {
    counters.exception_suppressed();
    tracing::error!("{} failed: {}", label, error_chain(error));
}

/// Formats an error followed by each of its sources
pub fn error_chain(error: &MirrorError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str("\n  caused by: ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
