//! URL handling module for Crawly
//!
//! This module provides URL identities (structural decomposition and storage
//! paths), content-kind classification from media types, and resolution of
//! raw links found in documents.

mod content_kind;
mod identity;
mod resolve;

// Re-export main types and functions
pub use content_kind::{Classification, ContentKind, MediaType};
pub use identity::{Identity, StoragePath};
pub use resolve::{ensure_scheme, has_web_scheme, resolve_link};
