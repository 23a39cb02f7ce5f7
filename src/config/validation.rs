use crate::config::types::{Config, CrawlerConfig, DownloaderConfig, HttpConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for any worker count
const MAX_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_downloader_config(&config.downloader)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // 0 means "use available parallelism" and is resolved by the engine
    if config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "crawler concurrency must be at most {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.inbox_capacity < 1 {
        return Err(ConfigError::Validation(
            "crawler inbox-capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates downloader configuration
pub fn validate_downloader_config(config: &DownloaderConfig) -> Result<(), ConfigError> {
    if config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "downloader concurrency must be at most {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if let Some(dir) = &config.dest_dir {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "downloader dest-dir cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates HTTP client configuration
pub fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Parses and checks a seed URL
///
/// The seed must be an absolute `http` or `https` URL with a host, since the
/// host defines the crawl's domain scope.
pub fn parse_seed_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            raw
        )));
    }

    Ok(url)
}
