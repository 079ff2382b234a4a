use crate::config::types::{Config, EngineConfig, RecheckConfig, ServerConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_recheck_config(&config.recheck)?;
    validate_server_config(&config.server)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates fetch engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.max_parallel_downloads < 1 || config.max_parallel_downloads > 100 {
        return Err(ConfigError::Validation(format!(
            "max_parallel_downloads must be between 1 and 100, got {}",
            config.max_parallel_downloads
        )));
    }

    if config.queue_size < 1 {
        return Err(ConfigError::Validation(format!(
            "queue_size must be >= 1, got {}",
            config.queue_size
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.connect_timeout_ms < 100 || config.connect_timeout_ms > config.request_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_ms must be between 100ms and request_timeout_ms ({}ms), got {}ms",
            config.request_timeout_ms, config.connect_timeout_ms
        )));
    }

    Ok(())
}

/// Validates re-check scheduler configuration
fn validate_recheck_config(config: &RecheckConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    if config.top_n < 1 {
        return Err(ConfigError::Validation(format!(
            "top_n must be >= 1, got {}",
            config.top_n
        )));
    }

    Ok(())
}

/// Validates HTTP server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.bind_address.parse::<std::net::IpAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "bind_address must be an IP address, got '{}'",
            config.bind_address
        )));
    }

    if config.max_urls_in_search_results < 1 {
        return Err(ConfigError::Validation(format!(
            "max_urls_in_search_results must be >= 1, got {}",
            config.max_urls_in_search_results
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
