//! Crawler module: the concurrent crawl pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP probing, fetching and persistence of resources
//! - HTML link scanning
//! - The hand-off queues between pipeline stages
//! - The intake, fetch and extract worker loops
//! - Overall crawl coordination and shutdown

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod seeds;
mod shutdown;
mod stages;

pub use coordinator::{CrawlReport, Crawler, TaskOutcomes};
pub use fetcher::{build_http_client, Fetcher, PersistOutcome, Resource, DEFAULT_CHUNK_SIZE};
pub use parser::{HtmlLinkScan, LinkScan};
pub use scheduler::{CrawlItem, ExtractItem, FetchItem, Pipeline, WorkQueue};
pub use seeds::{parse_seed_lines, SeedSource};
pub use shutdown::ShutdownHandle;

use crate::config::Config;
use crate::CrawlyResult;

/// Runs a complete crawl with the configured seeds and hooks
///
/// This is the simplest entry point. Use [`Crawler`] directly to override the
/// seeds, replace hooks, or stop the crawl from elsewhere.
///
/// # Example
///
/// ```no_run
/// use crawly::config::load_config;
/// use crawly::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawly.toml"))?;
/// let report = crawl(config).await?;
/// println!("visited {} items", report.stats.visited);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> CrawlyResult<CrawlReport> {
    let seeds = SeedSource::from_config(&config.seeds);
    Crawler::new(config, seeds)?.run().await
}
