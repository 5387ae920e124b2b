//! Wiki-Mirror: a static mirror builder for MediaWiki sites
//!
//! This crate crawls a MediaWiki instance and writes a self-contained static copy:
//! rewritten HTML pages with relative links, a sanitized stylesheet, and locally
//! stored, recompressed images.

pub mod config;
pub mod crawler;
pub mod images;
pub mod output;
pub mod render;
pub mod state;
pub mod url;
pub mod wiki;

use thiserror::Error;

/// Main error type for Wiki-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("MediaWiki API error [{code}]: {info}")]
    Api { code: String, info: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Missing required query parameter \"{0}\"")]
    MissingParameter(&'static str),

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Image error for {path}: {source}")]
    Image {
        path: String,
        source: image::ImageError,
    },

    #[error("Task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run cancelled by interrupt")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Wiki-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_mirror, Coordinator};
pub use output::{evaluate, RunSummary, Verdict};
pub use state::{CounterSnapshot, Counters};
pub use url::{RedirectTable, RedirectTableBuilder};
pub use wiki::WikiClient;
