//! Output module for crawl reports and exports
//!
//! This module handles:
//! - Recording crawl statistics and printing the final report
//! - Exporting the link graph (who links to whom) recorded in the ledger

pub mod stats;

pub use stats::{print_statistics, Counter, CrawlStats, StatsSnapshot};

use crate::state::Ledger;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the ledger's referrer index as `<url>\t<referrer>` lines
///
/// Lines are sorted by URL, then referrer. Seeds discovered only from the seed
/// list have no referrers and produce no lines.
///
/// # Returns
///
/// * `Ok(usize)` - Number of lines written
/// * `Err(io::Error)` - The file could not be written
pub fn write_link_graph(ledger: &Ledger, path: &Path) -> std::io::Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let mut lines = 0;

    for (url, referrers) in ledger.link_graph() {
        for referrer in referrers {
            writeln!(writer, "{}\t{}", url, referrer)?;
            lines += 1;
        }
    }

    writer.flush()?;
    Ok(lines)
}
