//! State module for tracking mirror progress
//!
//! The counters are the only state shared between tasks apart from the frozen
//! redirect table; the pass/fail verdict is derived from them alone.

mod counters;

// Re-export main types
pub use counters::{CounterSnapshot, Counters};
