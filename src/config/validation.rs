use crate::config::types::{Config, CrawlerConfig, HooksConfig, OutputConfig, SeedsConfig, UserAgentConfig};
use crate::hooks::catalog;
use crate::ConfigError;
use url::Url;

const MAX_POOL_SIZE: usize = 64;
const MIN_CHUNK_SIZE: usize = 1024;
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;
const MAX_THROTTLE_MS: u64 = 60_000;
const MAX_REDIRECTS: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_hooks_config(&config.hooks, &config.output)?;
    validate_seeds_config(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, size) in [
        ("producers", config.producers),
        ("fetchers", config.fetchers),
        ("extractors", config.extractors),
    ] {
        if size < 1 || size > MAX_POOL_SIZE {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_POOL_SIZE, size
            )));
        }
    }

    if config.throttle_ms > MAX_THROTTLE_MS {
        return Err(ConfigError::Validation(format!(
            "throttle-ms must be <= {}ms, got {}ms",
            MAX_THROTTLE_MS, config.throttle_ms
        )));
    }

    if config.chunk_size < MIN_CHUNK_SIZE || config.chunk_size > MAX_CHUNK_SIZE {
        return Err(ConfigError::Validation(format!(
            "chunk-size must be between {} and {} bytes, got {}",
            MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, config.chunk_size
        )));
    }

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs and connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
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

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("visited-log", &config.visited_log),
        ("log-file", &config.log_file),
        ("link-graph", &config.link_graph),
    ] {
        if matches!(value, Some(path) if path.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be an empty path",
                name
            )));
        }
    }

    Ok(())
}

/// Validates that every hook name refers to a built-in hook
fn validate_hooks_config(hooks: &HooksConfig, output: &OutputConfig) -> Result<(), ConfigError> {
    let chains: [(&'static str, &[String], &[&str]); 6] = [
        ("acceptor", hooks.acceptors.as_slice(), catalog::ACCEPTORS),
        ("visitor", hooks.visitors.as_slice(), catalog::VISITORS),
        ("cleaner", hooks.cleaners.as_slice(), catalog::CLEANERS),
        ("validator", hooks.validators.as_slice(), catalog::VALIDATORS),
        ("download handler", hooks.download_handlers.as_slice(), catalog::DOWNLOAD_HANDLERS),
        ("parsing handler", hooks.parsing_handlers.as_slice(), catalog::PARSING_HANDLERS),
    ];

    for (chain, names, known) in chains {
        if let Some(name) = names.iter().find(|name| !known.contains(&name.as_str())) {
            return Err(ConfigError::UnknownHook {
                chain,
                name: name.clone(),
            });
        }
    }

    if hooks.visitors.iter().any(|v| v == catalog::VISITED_LOG) && output.visited_log.is_none() {
        return Err(ConfigError::Validation(
            "the visited-log visitor requires output.visited-log to be set".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed sources
fn validate_seeds_config(seeds: &SeedsConfig) -> Result<(), ConfigError> {
    if seeds.file.is_some() && !seeds.urls.is_empty() {
        return Err(ConfigError::Validation(
            "set either seeds.file or seeds.urls, not both".to_string(),
        ));
    }

    if matches!(&seeds.file, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "seeds.file cannot be an empty path".to_string(),
        ));
    }

    for seed in &seeds.urls {
        let seed = crate::url::ensure_scheme(seed.trim());
        Url::parse(&seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
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

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
