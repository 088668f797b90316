use crate::config::types::{CatalogConfig, Config, HttpConfig, OutputConfig, SelectorConfig};
use crate::crawler::TileSelectors;
use crate::url::split_page_url;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Run again after command-line overrides are applied.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if split_page_url(&config.base_url).1 == Some(u32::MAX) {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' encodes a page index with no page after it",
            config.base_url
        )));
    }

    if config.last_page < 1 {
        return Err(ConfigError::Validation(format!(
            "last_page must be >= 1, got {}",
            config.last_page
        )));
    }

    if let Some(start_page) = config.start_page {
        if start_page < 2 {
            return Err(ConfigError::Validation(format!(
                "start_page must be >= 2 (page 1 is the base URL), got {}",
                start_page
            )));
        }
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    // Must be usable as a header value
    if config.user_agent.chars().any(char::is_control) {
        return Err(ConfigError::Validation(format!(
            "user-agent must not contain control characters, got {:?}",
            config.user_agent
        )));
    }

    if config.timeout_seconds == 0 || config.connect_timeout_seconds == 0 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1 second, got timeout-seconds = {}, connect-timeout-seconds = {}",
            config.timeout_seconds, config.connect_timeout_seconds
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.errors_path.is_empty() {
        return Err(ConfigError::Validation(
            "errors_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector compiles and the stock label is usable
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    if config.in_stock.trim().is_empty() {
        return Err(ConfigError::Validation(
            "in_stock label cannot be empty".to_string(),
        ));
    }

    TileSelectors::new(config).map(|_| ())
}
