use crate::config::types::{Config, CrawlerConfig, FetcherMode, PageEntry, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

const MAX_CONCURRENT_FETCHES: u32 = 1024;
const MAX_FETCH_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler, config.fetcher.mode)?;
    validate_user_agent_config(&config.user_agent)?;
    if config.fetcher.mode == FetcherMode::Static {
        validate_pages(&config.pages)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig, mode: FetcherMode) -> Result<(), ConfigError> {
    if config.start.trim().is_empty() {
        return Err(ConfigError::Validation(
            "start address cannot be empty".to_string(),
        ));
    }

    // Canned addresses are opaque; only real fetches need a parseable URL
    if mode == FetcherMode::Http {
        let url = Url::parse(&config.start).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", config.start, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Start URL '{}' must use http or https",
                config.start
            )));
        }
    }

    if let Some(limit) = config.max_concurrent_fetches {
        if !(1..=MAX_CONCURRENT_FETCHES).contains(&limit) {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_fetches must be between 1 and {}, got {}",
                MAX_CONCURRENT_FETCHES, limit
            )));
        }
    }

    if config.fetch_retries > MAX_FETCH_RETRIES {
        return Err(ConfigError::Validation(format!(
            "fetch_retries must be <= {}, got {}",
            MAX_FETCH_RETRIES, config.fetch_retries
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the canned page table used by the static fetcher
fn validate_pages(pages: &[PageEntry]) -> Result<(), ConfigError> {
    if pages.is_empty() {
        return Err(ConfigError::Validation(
            "static fetcher requires at least one [[pages]] entry".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for page in pages {
        if page.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page address cannot be empty".to_string(),
            ));
        }

        if !seen.insert(page.address.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate page address '{}'",
                page.address
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
