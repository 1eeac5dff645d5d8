//! Crawler coordinator - main crawl orchestration logic
//!
//! The `Crawler` owns the configuration, the hook chains, the ledger and the
//! shutdown flag. `run` spawns the seeding task and the three worker pools,
//! waits until the frontier drains or shutdown is requested, then gives the
//! workers a grace period before aborting whatever is left.

use crate::config::Config;
use crate::crawler::parser::{HtmlLinkScan, LinkScan};
use crate::crawler::scheduler::Pipeline;
use crate::crawler::stages::{self, StageContext};
use crate::crawler::{Fetcher, SeedSource, ShutdownHandle};
use crate::hooks::{catalog, HookChains, HookContext};
use crate::output::stats::{CrawlStats, StatsSnapshot};
use crate::state::Ledger;
use crate::CrawlyResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};

/// How the worker tasks of a crawl ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOutcomes {
    pub completed: usize,
    pub cancelled: usize,
    pub panicked: usize,
}

impl TaskOutcomes {
    fn record(&mut self, result: Result<(), JoinError>) {
        match result {
            Ok(()) => self.completed += 1,
            Err(e) if e.is_panic() => {
                tracing::error!(error = %e, "Worker task panicked");
                self.panicked += 1;
            }
            Err(_) => self.cancelled += 1,
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// True if the crawl ended because the frontier drained
    pub drained: bool,
    /// Number of unique URLs recorded in the ledger
    pub urls_seen: usize,
    pub stats: StatsSnapshot,
    pub tasks: TaskOutcomes,
}

/// Main crawler structure
pub struct Crawler {
    config: Arc<Config>,
    seeds: SeedSource,
    hooks: HookChains,
    link_scan: Arc<dyn LinkScan>,
    ledger: Arc<Ledger>,
    stats: Arc<CrawlStats>,
    shutdown: ShutdownHandle,
}

impl Crawler {
    /// Creates a crawler with the hook chains named in the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `seeds` - Where the initial URLs come from
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlyError)` - A hook could not be built (e.g. the visited log
    ///   cannot be opened)
    pub fn new(config: Config, seeds: SeedSource) -> CrawlyResult<Self> {
        let hooks = catalog::build_chains(&config)?;

        Ok(Self {
            config: Arc::new(config),
            seeds,
            hooks,
            link_scan: Arc::new(HtmlLinkScan),
            ledger: Arc::new(Ledger::new()),
            stats: Arc::new(CrawlStats::new()),
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Replaces the configured hook chains
    pub fn with_hooks(mut self, hooks: HookChains) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces the default HTML link scanner
    pub fn with_link_scan(mut self, link_scan: impl LinkScan + 'static) -> Self {
        self.link_scan = Arc::new(link_scan);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hooks(&self) -> &HookChains {
        &self.hooks
    }

    /// The crawl's ledger; stays readable after `run` returns
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }

    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// A handle that stops the crawl from another task, thread or signal handler
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs the crawl to completion
    ///
    /// Returns once the frontier has drained or shutdown was requested and
    /// the workers have stopped (or been aborted after `shutdown-grace-ms`).
    /// Only startup failures (unreadable seed file, HTTP client) are errors.
    pub async fn run(self) -> CrawlyResult<CrawlReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        let crawler = &self.config.crawler;

        let seeds = self.seeds.load().await?;
        let fetcher = Fetcher::from_config(&self.config)?;
        let pipeline = Arc::new(Pipeline::new(self.shutdown.token().clone()));

        for (chain, names) in self.hooks.describe() {
            tracing::debug!(chain, hooks = ?names, "Hook chain");
        }
        tracing::info!(
            seeds = seeds.len(),
            producers = crawler.producers,
            fetchers = crawler.fetchers,
            extractors = crawler.extractors,
            "Starting crawl"
        );

        let ctx = Arc::new(StageContext {
            pipeline: Arc::clone(&pipeline),
            hooks: self.hooks.clone(),
            hook_ctx: HookContext::new(Arc::clone(&self.ledger), &self.config.output.root),
            fetcher,
            link_scan: Arc::clone(&self.link_scan),
            stats: Arc::clone(&self.stats),
            throttle: Duration::from_millis(crawler.throttle_ms),
        });

        let mut tasks = JoinSet::new();
        tasks.spawn(stages::seed_frontier(Arc::clone(&pipeline), seeds));
        for worker in 0..crawler.producers {
            tasks.spawn(stages::intake_worker(Arc::clone(&ctx), worker));
        }
        for worker in 0..crawler.fetchers {
            tasks.spawn(stages::fetch_worker(Arc::clone(&ctx), worker));
        }
        for worker in 0..crawler.extractors {
            tasks.spawn(stages::extract_worker(Arc::clone(&ctx), worker));
        }

        let mut outcomes = TaskOutcomes::default();

        // Tasks only finish early on panic or after shutdown
        loop {
            tokio::select! {
                _ = self.shutdown.requested() => break,
                joined = tasks.join_next() => match joined {
                    Some(result) => outcomes.record(result),
                    None => break,
                },
            }
        }

        let drained = pipeline.is_drained();
        tracing::info!(
            drained,
            in_flight = pipeline.in_flight(),
            "Stopping workers"
        );

        let grace = Duration::from_millis(crawler.shutdown_grace_ms);
        join_with_grace(&mut tasks, grace, &mut outcomes).await;

        let report = CrawlReport {
            started_at,
            duration: start.elapsed(),
            drained,
            urls_seen: self.ledger.len(),
            stats: self.stats.snapshot(),
            tasks: outcomes,
        };

        tracing::info!(
            duration_ms = report.duration.as_millis() as u64,
            urls_seen = report.urls_seen,
            visited = report.stats.visited,
            "Crawl finished"
        );

        Ok(report)
    }
}

/// Waits for the remaining tasks, aborting them once `grace` has elapsed
async fn join_with_grace(tasks: &mut JoinSet<()>, grace: Duration, outcomes: &mut TaskOutcomes) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(result)) => outcomes.record(result),
            Ok(None) => return,
            Err(_) => {
                tracing::warn!(
                    remaining = tasks.len(),
                    grace_ms = grace.as_millis() as u64,
                    "Grace period elapsed, aborting workers"
                );
                tasks.abort_all();
                while let Some(result) = tasks.join_next().await {
                    outcomes.record(result);
                }
                return;
            }
        }
    }
}
