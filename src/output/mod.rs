//! Output module: the mirror directory and the run verdict
//!
//! This module handles:
//! - Clearing the output directory at the start of a run
//! - Moving the home page to `index.html` at the end
//! - Evaluating and printing the run outcome

mod filesystem;
mod outcome;

pub use filesystem::{clear_output_dir, move_home_to_index, output_path};
pub use outcome::{evaluate, print_summary, RunSummary, Verdict};
