//! Crawly: a recursive web content crawler
//!
//! This crate implements a crawler that walks hypertext from a set of seed URLs,
//! mirrors downloadable artifacts to disk, and records who links to whom.
//! Work flows through three pools of workers (intake, fetch, extract) connected
//! by queues, with pluggable hook chains at every stage.

pub mod config;
pub mod console;
pub mod crawler;
pub mod hooks;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Crawly operations
#[derive(Debug, Error)]
pub enum CrawlyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Failed to read seeds from {}: {source}", path.display())]
    Seeds {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown {chain} hook: '{name}'")]
    UnknownHook { chain: &'static str, name: String },
}

/// Errors raised while retrieving or persisting a resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Body of {url} was already consumed")]
    BodyConsumed { url: String },

    #[error("Failed to persist {url} to {}: {source}", path.display())]
    Persist {
        url: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FetchError {
    /// The URL the failed operation was working on
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Body { url, .. }
            | Self::BodyConsumed { url }
            | Self::Persist { url, .. } => url,
        }
    }
}

/// The metadata probe (HEAD) for a URL failed
///
/// Never escalated: a failed probe classifies the URL as unknown.
#[derive(Debug, Error)]
#[error("Metadata probe failed for {url}: {source}")]
pub struct ProbeError {
    pub url: String,
    pub source: reqwest::Error,
}

/// A discovered link could not be resolved against its source page
#[derive(Debug, Error)]
#[error("Cannot resolve link '{link}' against {base}: {source}")]
pub struct LinkResolutionError {
    pub link: String,
    pub base: String,
    pub source: ::url::ParseError,
}

/// A hook returned a negative verdict
///
/// Stops the rest of the hook chain and the action it guards, never the crawl.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rejected by {hook}: {reason}")]
pub struct HookRejection {
    pub hook: &'static str,
    pub reason: String,
}

impl HookRejection {
    pub fn new(hook: &'static str, reason: impl Into<String>) -> Self {
        Self {
            hook,
            reason: reason.into(),
        }
    }
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {source}")]
    Parse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Crawly operations
pub type CrawlyResult<T> = std::result::Result<T, CrawlyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler, SeedSource, ShutdownHandle};
pub use state::{ItemState, Ledger};
pub use crate::url::{Classification, ContentKind, Identity};
