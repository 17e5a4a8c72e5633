use crate::config::types::{Config, InputConfig, ScraperConfig, UserAgentConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Upper bound for the backoff unit; larger values stall a batch for minutes
const MAX_BACKOFF_UNIT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_input_config(&config.input)?;
    Ok(())
}

/// Validates pacing and retry settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_requests_per_second(config.requests_per_second)?;
    validate_timeout_seconds(config.timeout_seconds)?;
    validate_max_retries(config.max_retries)?;

    if config.backoff_unit_ms > MAX_BACKOFF_UNIT_MS {
        return Err(ConfigError::Validation(format!(
            "backoff-unit-ms must be <= {}, got {}",
            MAX_BACKOFF_UNIT_MS, config.backoff_unit_ms
        )));
    }

    Ok(())
}

pub(crate) fn validate_requests_per_second(rate: f64) -> Result<(), ConfigError> {
    interval_for_rate(rate).map(|_| ())
}

/// Spacing between two requests at `rate` requests per second
pub(crate) fn interval_for_rate(rate: f64) -> Result<Duration, ConfigError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "requests-per-second must be a positive number, got {}",
            rate
        )));
    }

    Duration::try_from_secs_f64(1.0 / rate).map_err(|_| {
        ConfigError::Validation(format!(
            "requests-per-second {} is too small to schedule",
            rate
        ))
    })
}

pub(crate) fn validate_timeout_seconds(timeout: f64) -> Result<(), ConfigError> {
    timeout_duration(timeout).map(|_| ())
}

/// Converts a timeout in seconds, rejecting values a `Duration` cannot hold
pub(crate) fn timeout_duration(timeout: f64) -> Result<Duration, ConfigError> {
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be a positive number, got {}",
            timeout
        )));
    }

    Duration::try_from_secs_f64(timeout).map_err(|_| {
        ConfigError::Validation(format!("timeout-seconds {} is out of range", timeout))
    })
}

pub(crate) fn validate_max_retries(max_retries: u32) -> Result<(), ConfigError> {
    if max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            max_retries
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates the inline URL list
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    for url in &config.urls {
        validate_target_url(url)?;
    }

    if let Some(path) = &config.urls_file {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "urls-file cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that a batch URL parses and uses an http(s) scheme
pub fn validate_target_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl(format!(
            "URL '{}' must use http or https, got '{}'",
            url, other
        ))),
    }
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
