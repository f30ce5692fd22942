use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site and its path conventions
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use HTTP or HTTPS",
            config.root_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' has no host",
            config.root_url
        )));
    }

    validate_path("category-index-path", &config.category_index_path)?;
    validate_path("item-path-segment", &config.item_path_segment)?;
    validate_path("category-path-segment", &config.category_path_segment)?;
    validate_path("tag-path-segment", &config.tag_path_segment)?;

    Ok(())
}

/// Validates a path convention: non-empty and rooted
fn validate_path(name: &str, path: &str) -> Result<(), ConfigError> {
    if path.is_empty() || path == "/" {
        return Err(ConfigError::Validation(format!(
            "{} cannot be empty",
            name
        )));
    }

    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must start with '/', got '{}'",
            name, path
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let (min, max) = config.delay_range();
    if min > max {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}ms) must not exceed max-delay-ms ({}ms)",
            min.as_millis(),
            max.as_millis()
        )));
    }

    let timeout = config.request_timeout().as_secs();
    if !(1..=300).contains(&timeout) {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 300, got {}",
            timeout
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-every must be >= 1, got {}",
            config.checkpoint_every
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    for (name, stem) in [
        ("database-name", &config.database_name),
        ("checkpoint-prefix", &config.checkpoint_prefix),
    ] {
        if stem.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }

        if stem.contains('/') || stem.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "{} must be a file name, got '{}'",
                name, stem
            )));
        }
    }

    Ok(())
}
