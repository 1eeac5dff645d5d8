//! Crawl statistics
//!
//! Workers bump lock-free counters as items move through the pipeline; a
//! snapshot is taken for the final report.

use crate::crawler::CrawlReport;
use std::sync::atomic::{AtomicU64, Ordering};

/// The events counted during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Discovered,
    Accepted,
    Rejected,
    Fetched,
    FetchFailures,
    Extracted,
    LinksFound,
    UnresolvedLinks,
    Visited,
}

/// Shared crawl counters
#[derive(Debug, Default)]
pub struct CrawlStats {
    discovered: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    fetched: AtomicU64,
    fetch_failures: AtomicU64,
    extracted: AtomicU64,
    links_found: AtomicU64,
    unresolved_links: AtomicU64,
    visited: AtomicU64,
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Items popped from the frontier
    pub discovered: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Resources retrieved with a success status
    pub fetched: u64,
    /// Transport errors, error statuses and unreadable bodies
    pub fetch_failures: u64,
    /// Hypertext pages scanned for links
    pub extracted: u64,
    /// Raw link candidates found in scanned pages
    pub links_found: u64,
    pub unresolved_links: u64,
    pub visited: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Discovered => &self.discovered,
            Counter::Accepted => &self.accepted,
            Counter::Rejected => &self.rejected,
            Counter::Fetched => &self.fetched,
            Counter::FetchFailures => &self.fetch_failures,
            Counter::Extracted => &self.extracted,
            Counter::LinksFound => &self.links_found,
            Counter::UnresolvedLinks => &self.unresolved_links,
            Counter::Visited => &self.visited,
        }
    }

    pub fn incr(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counter, n: u64) {
        self.counter(counter).fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            discovered: self.get(Counter::Discovered),
            accepted: self.get(Counter::Accepted),
            rejected: self.get(Counter::Rejected),
            fetched: self.get(Counter::Fetched),
            fetch_failures: self.get(Counter::FetchFailures),
            extracted: self.get(Counter::Extracted),
            links_found: self.get(Counter::LinksFound),
            unresolved_links: self.get(Counter::UnresolvedLinks),
            visited: self.get(Counter::Visited),
        }
    }
}

/// Prints the crawl report to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    let stats = &report.stats;

    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Duration: {:.1}s", report.duration.as_secs_f64());
    println!(
        "  Ended by: {}",
        if report.drained {
            "frontier drained"
        } else {
            "shutdown request"
        }
    );
    println!("  Unique URLs seen: {}", report.urls_seen);
    println!();

    println!("Pipeline:");
    println!("  Discovered: {}", stats.discovered);
    println!("  Accepted: {}", stats.accepted);
    println!("  Rejected: {}", stats.rejected);
    println!("  Fetched: {}", stats.fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Pages scanned: {}", stats.extracted);
    println!(
        "  Links found: {} ({} unresolvable)",
        stats.links_found, stats.unresolved_links
    );
    println!("  Visited: {}", stats.visited);
    println!();

    let tasks = &report.tasks;
    if tasks.cancelled > 0 || tasks.panicked > 0 {
        println!(
            "Workers: {} completed, {} aborted, {} panicked",
            tasks.completed, tasks.cancelled, tasks.panicked
        );
        println!();
    }

    let attempted = stats.fetched + stats.fetch_failures;
    let success_rate = if attempted > 0 {
        (stats.fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetches succeeded)",
        success_rate, stats.fetched, attempted
    );
}
