//! Run-wide counters shared by every task
//!
//! Both counters only ever grow, so completion order between tasks does not
//! matter; atomics make the updates safe on the multi-threaded runtime.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one mirror run
#[derive(Debug, Default)]
pub struct Counters {
    processed_pages: AtomicU64,
    suppressed_exceptions: AtomicU64,
}

/// A point-in-time copy of [`Counters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Pages rendered and written successfully
    pub processed_pages: u64,

    /// Task failures that were logged and contained
    pub suppressed_exceptions: u64,
}

impl Counters {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully written page
    pub fn page_processed(&self) {
        self.processed_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a contained task failure
    pub fn exception_suppressed(&self) {
        self.suppressed_exceptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Pages processed so far
    pub fn processed_pages(&self) -> u64 {
        self.processed_pages.load(Ordering::Relaxed)
    }

    /// Failures suppressed so far
    pub fn suppressed_exceptions(&self) -> u64 {
        self.suppressed_exceptions.load(Ordering::Relaxed)
    }

    /// Copies both counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            processed_pages: self.processed_pages(),
            suppressed_exceptions: self.suppressed_exceptions(),
        }
    }
}
