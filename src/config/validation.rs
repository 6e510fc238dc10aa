use crate::config::types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // item_limit == 0 means unbounded, so any value is fine

    if config.workers < 1 || config.workers > 32 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 32, got {}",
            config.workers
        )));
    }

    if config.per_host_concurrency < 1 || config.per_host_concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "per_host_concurrency must be between 1 and 32, got {}",
            config.per_host_concurrency
        )));
    }

    if config.max_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms must be <= 60000ms, got {}ms",
            config.max_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates the user agent pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(index) = config.pool.iter().position(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user-agent pool entry {} is blank",
            index
        )));
    }

    Ok(())
}

/// Validates catalog endpoints and listing parameters
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_base_url("base_url", &config.base_url)?;
    validate_base_url("review_base_url", &config.review_base_url)?;

    if config.page_size < 1 || config.page_size > 500 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 500, got {}",
            config.page_size
        )));
    }

    if config.category.is_empty() || config.gender.is_empty() {
        return Err(ConfigError::Validation(
            "category and gender cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation("csv_path cannot be empty".to_string()));
    }

    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a base URL is absolute and uses http or https
fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, scheme
        ))),
    }
}
