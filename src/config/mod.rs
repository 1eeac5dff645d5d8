//! Configuration module for Crawly
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use crawly::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawly.toml")).unwrap();
//! println!("Crawler will run {} fetch workers", config.crawler.fetchers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HooksConfig, OutputConfig, SeedsConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
