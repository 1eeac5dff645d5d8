//! Visitation ledger: which URLs have been seen, and who links to them
//!
//! One ledger lives for the whole crawl. Only the acceptance stage mutates it,
//! which is what makes "fetch each URL at most once" hold while many pages
//! discover the same link concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct LedgerInner {
    seen: HashSet<String>,
    referrers: HashMap<String, HashSet<String>>,
}

/// Process-wide deduplication set plus reverse adjacency index
#[derive(Debug, Default)]
pub struct Ledger {
    inner: Mutex<LedgerInner>,
}

impl Ledger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single insert, so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true if the URL has been recorded before
    pub fn seen(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Records a URL discovered from `referrer`
    ///
    /// Adding to the seen-set is idempotent; a non-empty referrer is always
    /// added to the URL's referrer set, even if the URL was already seen.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not seen before
    /// * `false` - The URL was already in the ledger
    pub fn record(&self, url: &str, referrer: &str) -> bool {
        let mut inner = self.lock();

        if !referrer.is_empty() {
            inner
                .referrers
                .entry(url.to_string())
                .or_default()
                .insert(referrer.to_string());
        }

        inner.seen.insert(url.to_string())
    }

    /// All referrers recorded for a URL
    pub fn referrers_of(&self, url: &str) -> HashSet<String> {
        self.lock().referrers.get(url).cloned().unwrap_or_default()
    }

    /// Snapshot of every seen URL, in no particular order
    pub fn all_seen_urls(&self) -> Vec<String> {
        self.lock().seen.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().seen.is_empty()
    }

    /// Snapshot of the referrer index as `(url, sorted referrers)`, sorted by URL
    pub fn link_graph(&self) -> Vec<(String, Vec<String>)> {
        let inner = self.lock();
        let mut graph: Vec<(String, Vec<String>)> = inner
            .referrers
            .iter()
            .map(|(url, referrers)| {
                let mut referrers: Vec<String> = referrers.iter().cloned().collect();
                referrers.sort();
                (url.clone(), referrers)
            })
            .collect();
        graph.sort();
        graph
    }
}
