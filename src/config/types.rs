use serde::Deserialize;

/// Main configuration structure for Wiki-Mirror
///
/// Only `username` and `password` are required; every table falls back to the
/// defaults for the ConTeXt Garden wiki.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub wiki: WikiConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

/// Source wiki configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Base URL of the wiki; `api.php`, `index.php` and `load.php` live under it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Title of the page that becomes the mirror's `index.html`
    #[serde(rename = "home-page")]
    pub home_page: String,

    /// Namespaces enumerated for redirects and content pages
    pub namespaces: Vec<i64>,

    /// ResourceLoader modules concatenated into `style.css`
    #[serde(rename = "stylesheet-modules")]
    pub stylesheet_modules: String,

    /// Display language requested for rendered pages
    pub language: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wiki.contextgarden.net/".to_string(),
            home_page: "Main_Page".to_string(),
            namespaces: vec![0],
            stylesheet_modules: "site.styles".to_string(),
            language: "en".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "wiki-mirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/gucci-on-fleek/context-wiki-mirror".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Transport and image limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum simultaneous in-flight requests against the wiki host
    #[serde(rename = "max-connections-per-host")]
    pub max_connections_per_host: u32,

    /// Overall timeout of a single request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Images larger than this on either axis are scaled down
    #[serde(rename = "max-image-dimension")]
    pub max_image_dimension: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_connections_per_host: 8,
            request_timeout_secs: 600,
            max_image_dimension: 1000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the static site is written into
    pub directory: String,

    /// Top-level entries that survive the clean at the start of a run
    pub preserve: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "site".to_string(),
            preserve: vec![".git".to_string(), "README.md".to_string()],
        }
    }
}

/// Pass/fail thresholds applied to the run counters
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// The run fails unless strictly more pages than this were processed
    #[serde(rename = "min-processed-pages")]
    pub min_processed_pages: u64,

    /// The run fails if more exceptions than this were suppressed
    #[serde(rename = "max-suppressed-exceptions")]
    pub max_suppressed_exceptions: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_processed_pages: 1000,
            max_suppressed_exceptions: 100,
        }
    }
}
