//! Hook chains: the extension points of the crawl pipeline
//!
//! Each pipeline stage runs an ordered chain of hooks:
//! - Acceptors decide whether a discovered URL is admitted (intake stage)
//! - Download handlers observe or persist fetched resources (fetch stage)
//! - Parsing handlers, link cleaners and link validators shape the links
//!   found in hypertext (extract stage)
//! - Visitors observe every item that reaches the end of the pipeline
//!
//! Gating hooks return `Result<(), HookRejection>`; the first rejection stops
//! the rest of its chain.

mod acceptors;
pub mod catalog;
mod downloads;
mod links;
mod visitors;

pub use acceptors::{HistoryAcceptor, SameHostAcceptor};
pub use downloads::MirrorDownloads;
pub use links::{SrcsetLinks, StripFragment, StripQuery, WebSchemeValidator};
pub use visitors::{TraceVisitor, VisitedLog};

use crate::crawler::Resource;
use crate::state::Ledger;
use crate::url::Identity;
use crate::HookRejection;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state a hook may consult while running
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The crawl's visitation ledger
    pub ledger: Arc<Ledger>,
    /// Root directory for persisted downloads
    pub output_root: PathBuf,
}

impl HookContext {
    pub fn new(ledger: Arc<Ledger>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            output_root: output_root.into(),
        }
    }
}

/// Decides whether a discovered URL enters the pipeline
///
/// Acceptors are the only hooks allowed to record into the ledger. They run
/// synchronously so a check-and-record cannot interleave with another worker.
pub trait Acceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn accept(&self, url: &str, referrer: &str, ctx: &HookContext) -> Result<(), HookRejection>;
}

/// Observes an item that finished the pipeline
#[async_trait]
pub trait Visitor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn visit(&self, url: &str, referrer: &str, ctx: &HookContext)
        -> Result<(), HookRejection>;
}

/// Rewrites a resolved link
pub trait LinkCleaner: Send + Sync {
    fn name(&self) -> &'static str;

    fn clean(&self, link: String, source: &Identity) -> String;
}

/// Decides whether a cleaned link is kept
pub trait LinkValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, link: &str) -> Result<(), HookRejection>;
}

/// Persists or observes a fetched resource
#[async_trait]
pub trait DownloadHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, resource: &mut Resource, ctx: &HookContext)
        -> Result<(), HookRejection>;
}

/// Finds links the built-in scanner does not look for
pub trait ParsingHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn links(&self, document: &str, resource: &Resource) -> Vec<String>;
}

/// The ordered hook chains of one crawl
#[derive(Clone, Default)]
pub struct HookChains {
    pub acceptors: Vec<Arc<dyn Acceptor>>,
    pub visitors: Vec<Arc<dyn Visitor>>,
    pub cleaners: Vec<Arc<dyn LinkCleaner>>,
    pub validators: Vec<Arc<dyn LinkValidator>>,
    pub download_handlers: Vec<Arc<dyn DownloadHandler>>,
    pub parsing_handlers: Vec<Arc<dyn ParsingHandler>>,
}

impl HookChains {
    /// Creates empty chains
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acceptor(mut self, acceptor: impl Acceptor + 'static) -> Self {
        self.acceptors.push(Arc::new(acceptor));
        self
    }

    pub fn with_visitor(mut self, visitor: impl Visitor + 'static) -> Self {
        self.visitors.push(Arc::new(visitor));
        self
    }

    pub fn with_cleaner(mut self, cleaner: impl LinkCleaner + 'static) -> Self {
        self.cleaners.push(Arc::new(cleaner));
        self
    }

    pub fn with_validator(mut self, validator: impl LinkValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn with_download_handler(mut self, handler: impl DownloadHandler + 'static) -> Self {
        self.download_handlers.push(Arc::new(handler));
        self
    }

    pub fn with_parsing_handler(mut self, handler: impl ParsingHandler + 'static) -> Self {
        self.parsing_handlers.push(Arc::new(handler));
        self
    }

    /// Runs the acceptor chain; the first rejection wins
    pub fn accept(&self, url: &str, referrer: &str, ctx: &HookContext) -> Result<(), HookRejection> {
        self.acceptors
            .iter()
            .try_for_each(|acceptor| acceptor.accept(url, referrer, ctx))
    }

    /// Runs the visitor chain; the first failure skips the remaining visitors
    pub async fn visit(&self, url: &str, referrer: &str, ctx: &HookContext) -> Result<(), HookRejection> {
        for visitor in &self.visitors {
            visitor.visit(url, referrer, ctx).await?;
        }
        Ok(())
    }

    /// Applies every cleaner in order
    pub fn clean(&self, link: String, source: &Identity) -> String {
        self.cleaners
            .iter()
            .fold(link, |link, cleaner| cleaner.clean(link, source))
    }

    /// Runs the validator chain; the first rejection drops the link
    pub fn validate(&self, link: &str) -> Result<(), HookRejection> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(link))
    }

    /// Runs the download handlers; the first rejection skips the rest
    pub async fn handle_download(
        &self,
        resource: &mut Resource,
        ctx: &HookContext,
    ) -> Result<(), HookRejection> {
        for handler in &self.download_handlers {
            handler.handle(resource, ctx).await?;
        }
        Ok(())
    }

    /// Collects links from every parsing handler
    pub fn supplemental_links(&self, document: &str, resource: &Resource) -> Vec<String> {
        self.parsing_handlers
            .iter()
            .flat_map(|handler| handler.links(document, resource))
            .collect()
    }

    /// Names of the configured hooks, chain by chain
    pub fn describe(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("acceptors", self.acceptors.iter().map(|h| h.name()).collect()),
            ("visitors", self.visitors.iter().map(|h| h.name()).collect()),
            ("cleaners", self.cleaners.iter().map(|h| h.name()).collect()),
            ("validators", self.validators.iter().map(|h| h.name()).collect()),
            (
                "download-handlers",
                self.download_handlers.iter().map(|h| h.name()).collect(),
            ),
            (
                "parsing-handlers",
                self.parsing_handlers.iter().map(|h| h.name()).collect(),
            ),
        ]
    }
}
