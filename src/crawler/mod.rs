//! Crawler module: orchestration of a mirror run
//!
//! This module contains the core mirroring logic, including:
//! - Redirect discovery ahead of rendering
//! - Concurrent page rendering and image mirroring
//! - Per-task failure containment

mod coordinator;
mod tasks;

pub use coordinator::{run_mirror, Coordinator};
pub use tasks::{contain, contain_join_error, error_chain};
