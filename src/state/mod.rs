//! State module for tracking crawl progress
//!
//! This module provides the shared state of a crawl and the lifecycle of the
//! items flowing through it.
//!
//! # Components
//!
//! - `ItemState`: Tracks the lifecycle of a single crawl item (discovered, accepted, fetching, visited, etc.)
//! - `Ledger`: Deduplication set of discovered URLs plus the index of who links to whom

mod item_state;
mod ledger;

// Re-export main types
pub use item_state::ItemState;
pub use ledger::Ledger;
