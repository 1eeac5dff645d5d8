//! Crawly main entry point
//!
//! This is the command-line interface for the Crawly recursive web crawler.

use anyhow::Context;
use clap::Parser;
use crawly::config::{load_config_with_hash, Config};
use crawly::console::{spawn_console, watch_signals};
use crawly::crawler::{Crawler, SeedSource};
use crawly::output::{print_statistics, write_link_graph};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Crawly: a recursive web content crawler
///
/// Crawly walks hypertext from a set of seed URLs, mirrors downloadable
/// artifacts to disk, and records which pages link to which. Type `q` or
/// `stop` (or send SIGINT/SIGTERM/SIGHUP) to stop a running crawl.
#[derive(Parser, Debug)]
#[command(name = "crawly")]
#[command(version)]
#[command(about = "A recursive web content crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URLs (override the seeds in the configuration)
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// Newline-delimited seed file (overrides the configuration)
    #[arg(long, value_name = "FILE", conflicts_with = "urls")]
    seeds: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Do not read operator commands from stdin
    #[arg(long)]
    no_console: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging(cli.verbose, cli.quiet, config.output.log_file.as_deref())?;
    tracing::info!(
        path = %cli.config.display(),
        hash = %config_hash,
        "Configuration loaded"
    );

    let seeds = seed_source(&cli, &config);

    if cli.dry_run {
        return handle_dry_run(&config, &seeds).await;
    }

    handle_crawl(config, seeds, cli.no_console).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to `log_file` through a non-blocking writer when set, otherwise to
/// stderr.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawly=info,warn"),
            1 => EnvFilter::new("crawly=debug,info"),
            2 => EnvFilter::new("crawly=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log-file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

/// Command-line seeds win over the configuration
fn seed_source(cli: &Cli, config: &Config) -> SeedSource {
    if !cli.urls.is_empty() {
        SeedSource::Urls(cli.urls.clone())
    } else if let Some(path) = &cli.seeds {
        SeedSource::File(path.clone())
    } else {
        SeedSource::from_config(&config.seeds)
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
async fn handle_dry_run(config: &Config, seeds: &SeedSource) -> anyhow::Result<()> {
    println!("=== Crawly Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Workers: {} intake, {} fetch, {} extract",
        config.crawler.producers, config.crawler.fetchers, config.crawler.extractors
    );
    println!("  Throttle: {}ms", config.crawler.throttle_ms);
    println!("  Chunk size: {} bytes", config.crawler.chunk_size);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!("  Shutdown grace: {}ms", config.crawler.shutdown_grace_ms);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Mirror root: {}", config.output.root);
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "(none)".to_string());
    println!("  Visited log: {}", optional(&config.output.visited_log));
    println!("  Log file: {}", optional(&config.output.log_file));
    println!("  Link graph: {}", optional(&config.output.link_graph));

    println!("\nHooks:");
    let hooks = &config.hooks;
    for (chain, names) in [
        ("acceptors", &hooks.acceptors),
        ("visitors", &hooks.visitors),
        ("cleaners", &hooks.cleaners),
        ("validators", &hooks.validators),
        ("download-handlers", &hooks.download_handlers),
        ("parsing-handlers", &hooks.parsing_handlers),
    ] {
        println!("  {}: [{}]", chain, names.join(", "));
    }

    let seeds = seeds.load().await?;
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seeds: SeedSource, no_console: bool) -> anyhow::Result<()> {
    let link_graph = config.output.link_graph.clone();

    let crawler = Crawler::new(config, seeds)?;
    let handle = crawler.shutdown_handle();
    let ledger = crawler.ledger();

    let signals = handle.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_signals(signals).await {
            tracing::warn!(error = %e, "Signal handlers unavailable");
        }
    });

    if !no_console {
        spawn_console(handle.clone()).context("Failed to start console thread")?;
        tracing::info!("Type q, quit, s or stop to end the crawl");
    }

    let report = match crawler.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Crawl failed");
            return Err(e.into());
        }
    };

    if let Some(path) = link_graph {
        let lines = write_link_graph(&ledger, Path::new(&path))
            .with_context(|| format!("Failed to write link graph to {}", path))?;
        tracing::info!(path = %path, lines, "Link graph written");
    }

    print_statistics(&report);
    Ok(())
}
