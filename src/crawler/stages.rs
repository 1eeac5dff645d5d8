//! Worker loops for the intake, fetch and extract pools
//!
//! Every loop checks the shutdown token between items and while waiting on a
//! queue or a throttle sleep. An item already being processed finishes its
//! current step. Per-item failures are logged and never leave the worker.

use crate::crawler::parser::LinkScan;
use crate::crawler::scheduler::{CrawlItem, ExtractItem, FetchItem, Pipeline};
use crate::crawler::Fetcher;
use crate::hooks::{HookChains, HookContext};
use crate::output::stats::{Counter, CrawlStats};
use crate::state::ItemState;
use crate::url::{ensure_scheme, resolve_link, Identity};
use reqwest::header::CONTENT_LENGTH;
use std::sync::Arc;
use std::time::Duration;

/// Everything a worker needs, shared by all pools
pub(crate) struct StageContext {
    pub pipeline: Arc<Pipeline>,
    pub hooks: HookChains,
    pub hook_ctx: HookContext,
    pub fetcher: Fetcher,
    pub link_scan: Arc<dyn LinkScan>,
    pub stats: Arc<CrawlStats>,
    pub throttle: Duration,
}

impl StageContext {
    /// Sleeps the throttle interval, cut short by shutdown
    async fn throttle(&self) {
        if self.throttle.is_zero() {
            return;
        }
        tokio::select! {
            _ = self.pipeline.shutdown().cancelled() => {}
            _ = tokio::time::sleep(self.throttle) => {}
        }
    }

    fn stopping(&self) -> bool {
        self.pipeline.shutdown().is_cancelled()
    }

    /// Terminates an item through the visitor chain
    async fn visit(&self, url: &str, referrer: &str, from: ItemState) {
        transition(url, from, ItemState::Visited);
        if let Err(rejection) = self.hooks.visit(url, referrer, &self.hook_ctx).await {
            tracing::warn!(url = %url, referrer = %referrer, error = %rejection, "Visitor failed");
        }
        self.stats.incr(Counter::Visited);
        self.pipeline.retire();
    }

    fn reject(&self, url: &str) {
        transition(url, ItemState::Discovered, ItemState::Rejected);
        self.stats.incr(Counter::Rejected);
        self.pipeline.retire();
    }
}

fn transition(url: &str, from: ItemState, to: ItemState) {
    debug_assert!(
        from.can_transition_to(to),
        "illegal transition {} -> {} for {}",
        from,
        to,
        url
    );
    tracing::trace!(url, from = %from, to = %to, "State transition");
}

/// Pushes the seeds onto the frontier, then releases the seeding count
pub(crate) async fn seed_frontier(pipeline: Arc<Pipeline>, seeds: Vec<String>) {
    let count = seeds.len();
    for seed in seeds {
        pipeline.discover(ensure_scheme(&seed), "");
    }
    tracing::info!(seeds = count, "Seeded frontier");
    pipeline.retire();
}

/// Intake: runs the acceptor chain and forwards survivors to the fetch queue
pub(crate) async fn intake_worker(ctx: Arc<StageContext>, worker: usize) {
    tracing::debug!(worker, "Intake worker started");

    while !ctx.stopping() {
        let Some(CrawlItem { url, referrer }) = ctx.pipeline.frontier.pop(ctx.pipeline.shutdown()).await
        else {
            break;
        };
        ctx.stats.incr(Counter::Discovered);

        // Acceptors and the ledger key on the parsed form of the URL
        match Identity::parse(&url) {
            Err(e) => {
                tracing::warn!(url = %url, referrer = %referrer, error = %e, "Unusable URL");
                ctx.reject(&url);
            }
            Ok(identity) => match ctx.hooks.accept(identity.as_str(), &referrer, &ctx.hook_ctx) {
                Err(rejection) => {
                    tracing::debug!(url = %identity, referrer = %referrer, reason = %rejection, "Rejected");
                    ctx.reject(identity.as_str());
                }
                Ok(()) => {
                    transition(identity.as_str(), ItemState::Discovered, ItemState::Accepted);
                    ctx.stats.incr(Counter::Accepted);
                    ctx.pipeline.fetch.push(FetchItem { identity, referrer });
                }
            },
        }

        ctx.throttle().await;
    }

    tracing::debug!(worker, "Intake worker stopped");
}

/// Fetch: probes, retrieves, runs download handlers and routes the result
pub(crate) async fn fetch_worker(ctx: Arc<StageContext>, worker: usize) {
    tracing::debug!(worker, "Fetch worker started");

    while !ctx.stopping() {
        let Some(FetchItem {
            mut identity,
            referrer,
        }) = ctx.pipeline.fetch.pop(ctx.pipeline.shutdown()).await
        else {
            break;
        };

        ctx.throttle().await;
        let url = identity.as_str().to_string();
        transition(&url, ItemState::Accepted, ItemState::Fetching);

        let kind = ctx.fetcher.probe(&mut identity).await;

        let mut resource = match ctx.fetcher.fetch(identity).await {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(url = %e.url(), referrer = %referrer, error = %e, "Fetch failed");
                ctx.stats.incr(Counter::FetchFailures);
                transition(&url, ItemState::Fetching, ItemState::FetchFailed);
                ctx.visit(&url, &referrer, ItemState::FetchFailed).await;
                continue;
            }
        };

        if !resource.status().is_success() {
            tracing::warn!(url = %url, referrer = %referrer, status = resource.status().as_u16(), "Error status");
            ctx.stats.incr(Counter::FetchFailures);
            transition(&url, ItemState::Fetching, ItemState::FetchFailed);
            ctx.visit(&url, &referrer, ItemState::FetchFailed).await;
            continue;
        }

        if kind.is_recursable() {
            if let Err(e) = resource.buffer().await {
                tracing::warn!(url = %url, referrer = %referrer, error = %e, "Failed to read body");
                ctx.stats.incr(Counter::FetchFailures);
                transition(&url, ItemState::Fetching, ItemState::FetchFailed);
                ctx.visit(&url, &referrer, ItemState::FetchFailed).await;
                continue;
            }
        }

        transition(&url, ItemState::Fetching, ItemState::Fetched);
        ctx.stats.incr(Counter::Fetched);
        tracing::debug!(
            url = %url,
            kind = %kind,
            status = resource.status().as_u16(),
            length = ?resource.headers().get(CONTENT_LENGTH),
            "Fetched"
        );

        let state = if kind.is_downloadable() {
            transition(&url, ItemState::Fetched, ItemState::Persisting);
            ItemState::Persisting
        } else {
            ItemState::Fetched
        };

        if let Err(rejection) = ctx.hooks.handle_download(&mut resource, &ctx.hook_ctx).await {
            tracing::warn!(url = %url, error = %rejection, "Download handler failed");
        }

        if kind.is_recursable() {
            transition(&url, ItemState::Fetched, ItemState::Extracting);
            ctx.pipeline.extract.push(ExtractItem { resource, referrer });
        } else {
            ctx.visit(&url, &referrer, state).await;
        }
    }

    tracing::debug!(worker, "Fetch worker stopped");
}

/// Extract: scans hypertext for links and feeds them back to the frontier
pub(crate) async fn extract_worker(ctx: Arc<StageContext>, worker: usize) {
    tracing::debug!(worker, "Extract worker started");

    while !ctx.stopping() {
        let Some(ExtractItem { resource, referrer }) =
            ctx.pipeline.extract.pop(ctx.pipeline.shutdown()).await
        else {
            break;
        };

        ctx.throttle().await;
        let url = resource.url().to_string();

        match resource.text() {
            Ok(document) => {
                let discovered = extract_links(&ctx, &resource, &document);
                ctx.stats.incr(Counter::Extracted);
                tracing::debug!(url = %url, links = discovered, "Extracted");
            }
            Err(e) => tracing::warn!(url = %url, error = %e, "No document to scan"),
        }

        ctx.visit(&url, &referrer, ItemState::Extracting).await;
    }

    tracing::debug!(worker, "Extract worker stopped");
}

/// Scans, resolves, cleans and validates links, pushing survivors to the
/// frontier. Returns how many were pushed.
fn extract_links(ctx: &StageContext, resource: &crate::crawler::Resource, document: &str) -> usize {
    let source = resource.identity();
    let base = source.url();

    let mut candidates = ctx.link_scan.scan(document);
    candidates.extend(ctx.hooks.supplemental_links(document, resource));
    ctx.stats.add(Counter::LinksFound, candidates.len() as u64);

    let mut pushed = 0;
    for raw in candidates {
        let resolved = match resolve_link(base, &raw) {
            Ok(Some(link)) => link,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping link");
                ctx.stats.incr(Counter::UnresolvedLinks);
                continue;
            }
        };

        let cleaned = ctx.hooks.clean(resolved, source);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }

        if let Err(rejection) = ctx.hooks.validate(cleaned) {
            tracing::trace!(link = cleaned, reason = %rejection, "Link dropped");
            continue;
        }

        ctx.pipeline.discover(ensure_scheme(cleaned), source.as_str());
        pushed += 1;
    }

    pushed
}
