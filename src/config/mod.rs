//! Configuration module for Wiki-Mirror
//!
//! This module handles loading, parsing, and validating the TOML credentials file.
//! Apart from the username and password every setting has a default.
//!
//! # Example
//!
//! ```no_run
//! use wiki_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("credentials.toml")).unwrap();
//! println!("Writing the mirror to {}", config.output.directory);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, ThresholdConfig, UserAgentConfig, WikiConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
