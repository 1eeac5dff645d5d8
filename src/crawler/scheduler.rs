//! Hand-off queues between the pipeline stages
//!
//! This module handles:
//! - The three work queues (frontier, fetch, extract), each shared by a pool
//! - Counting in-flight items so the crawl knows when the frontier is drained
//!
//! The queues are unbounded because the pipeline is a cycle: extract workers
//! feed the frontier, and a bounded frontier could deadlock the pools.

use crate::crawler::Resource;
use crate::url::Identity;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// A discovered URL and the page it was found on (empty for seeds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    pub url: String,
    pub referrer: String,
}

/// An accepted URL waiting to be fetched
#[derive(Debug)]
pub struct FetchItem {
    pub identity: Identity,
    pub referrer: String,
}

/// Fetched hypertext waiting for link extraction
#[derive(Debug)]
pub struct ExtractItem {
    pub resource: Resource,
    pub referrer: String,
}

/// A multi-consumer FIFO queue shared by one worker pool
pub struct WorkQueue<T> {
    sender: UnboundedSender<T>,
    receiver: Arc<Mutex<UnboundedReceiver<T>>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    pub fn push(&self, item: T) {
        // The queue owns its receiver, so the channel cannot be closed
        let _ = self.sender.send(item);
    }

    /// Waits for the next item, or returns None once `shutdown` is cancelled
    pub async fn pop(&self, shutdown: &CancellationToken) -> Option<T> {
        let mut receiver = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return None,
            guard = self.receiver.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            item = receiver.recv() => item,
        }
    }

    /// Takes an item only if one is immediately available
    pub fn try_pop(&self) -> Option<T> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }
}

/// The queues of one crawl plus its in-flight accounting
///
/// An item is in flight from the moment it is pushed on the frontier until it
/// is rejected or visited. The count starts at one on behalf of the seeding
/// task; when it returns to zero the frontier is drained and the crawl's
/// shutdown token is cancelled.
pub struct Pipeline {
    pub frontier: WorkQueue<CrawlItem>,
    pub fetch: WorkQueue<FetchItem>,
    pub extract: WorkQueue<ExtractItem>,
    in_flight: AtomicUsize,
    drained: AtomicBool,
    shutdown: CancellationToken,
}

impl Pipeline {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            frontier: WorkQueue::new(),
            fetch: WorkQueue::new(),
            extract: WorkQueue::new(),
            in_flight: AtomicUsize::new(1),
            drained: AtomicBool::new(false),
            shutdown,
        }
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Pushes a newly discovered URL onto the frontier
    pub fn discover(&self, url: impl Into<String>, referrer: impl Into<String>) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.frontier.push(CrawlItem {
            url: url.into(),
            referrer: referrer.into(),
        });
    }

    /// Marks one item as finished (rejected or visited)
    ///
    /// Also used by the seeding task to drop its own count once every seed is
    /// on the frontier.
    pub fn retire(&self) {
        let previous = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "in-flight count underflow");
        if previous == 1 {
            tracing::info!("Frontier drained");
            self.drained.store(true, Ordering::SeqCst);
            self.shutdown.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// True if the crawl ended because there was nothing left to do
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }
}
