use crate::config::types::{
    Config, HttpConfig, InspectorConfig, OutputConfig, ProgressConfig, SitemapConfig,
};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_inspector_config(&config.inspector)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_output_config(&config.output)?;
    validate_progress_config(&config.progress)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates page inspection configuration
fn validate_inspector_config(config: &InspectorConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be >= 1, got {}",
            config.navigation_timeout_secs
        )));
    }

    validate_selector(&config.card_selector)?;
    validate_selector(&config.image_selector)?;
    validate_selector(&config.name_selector)?;

    Ok(())
}

/// Validates sitemap filtering configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    // An empty pattern would match every entry and silently disable filtering
    if config.allow_list.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "allow_list entries cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates progress channel configuration
fn validate_progress_config(config: &ProgressConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "channel_capacity must be >= 1, got {}",
            config.channel_capacity
        )));
    }
    Ok(())
}

/// Checks that a CSS selector parses
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector(".bpag-product-card").is_ok());
        assert!(validate_selector("div.card > img").is_ok());
        assert!(validate_selector(".my-4.text-lg.font-bold.heading-font").is_ok());

        assert!(validate_selector("").is_err());
        assert!(validate_selector("   ").is_err());
        assert!(validate_selector("div[").is_err());
    }

    #[test]
    fn test_empty_allow_list_entry_rejected() {
        let mut config = Config::default();
        config.sitemap.allow_list.push(String::new());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_allow_list_is_allowed() {
        let mut config = Config::default();
        config.sitemap.allow_list.clear();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_channel_capacity_rejected() {
        let mut config = Config::default();
        config.progress.channel_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_user_agent_rejected() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
