use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig, WikiConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_credentials(config)?;
    validate_wiki_config(&config.wiki)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_credentials(config: &Config) -> Result<(), ConfigError> {
    if config.username.trim().is_empty() || config.password.is_empty() {
        return Err(ConfigError::Validation(
            "the credentials file is missing a username or password".to_string(),
        ));
    }
    Ok(())
}

/// Validates the source wiki configuration
fn validate_wiki_config(config: &WikiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    // Everything is joined onto the base, which only works for a directory URL
    if !config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base-url must end with '/', got '{}'",
            config.base_url
        )));
    }

    if config.home_page.is_empty() {
        return Err(ConfigError::Validation(
            "home-page cannot be empty".to_string(),
        ));
    }

    if config.namespaces.is_empty() {
        return Err(ConfigError::Validation(
            "at least one namespace must be mirrored".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates transport and image limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_connections_per_host < 1 || config.max_connections_per_host > 64 {
        return Err(ConfigError::Validation(format!(
            "max-connections-per-host must be between 1 and 64, got {}",
            config.max_connections_per_host
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_image_dimension < 16 {
        return Err(ConfigError::Validation(format!(
            "max-image-dimension must be >= 16px, got {}",
            config.max_image_dimension
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config
        .preserve
        .iter()
        .any(|entry| entry.is_empty() || entry.contains('/'))
    {
        return Err(ConfigError::Validation(
            "preserve entries must be plain top-level names".to_string(),
        ));
    }

    Ok(())
}
