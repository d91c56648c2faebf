use crate::config::types::{Config, CrawlConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if config.type_selector.is_empty() || config.scope_selector.is_empty() {
        return Err(ConfigError::Validation(
            "type-selector and scope-selector cannot be empty".to_string(),
        ));
    }

    if config.entity_table_id.is_empty() {
        return Err(ConfigError::Validation(
            "entity-table-id cannot be empty".to_string(),
        ));
    }

    if config.record_table_ids.is_empty() {
        return Err(ConfigError::Validation(
            "record-table-ids must name at least one table".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl behavior configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.enter_timeout_secs < 1 || config.enter_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "enter-timeout-secs must be between 1 and 300, got {}",
            config.enter_timeout_secs
        )));
    }

    if config.form_retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "form-retry-attempts must be <= 10, got {}",
            config.form_retry_attempts
        )));
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

    Ok(())
}
