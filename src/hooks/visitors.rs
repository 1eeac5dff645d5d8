use crate::hooks::{HookContext, Visitor};
use crate::HookRejection;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends one line per visited item to a log file
///
/// Lines are `<url>\t<referrer>` or just `<url>` when there is no referrer.
#[derive(Debug)]
pub struct VisitedLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl VisitedLog {
    /// Opens (creating if needed) the log in append mode
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(File::from_std(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Formats a visited-log line
fn log_line(url: &str, referrer: &str) -> String {
    if referrer.is_empty() {
        format!("{}\n", url)
    } else {
        format!("{}\t{}\n", url, referrer)
    }
}

#[async_trait]
impl Visitor for VisitedLog {
    fn name(&self) -> &'static str {
        "visited-log"
    }

    async fn visit(&self, url: &str, referrer: &str, _ctx: &HookContext) -> Result<(), HookRejection> {
        let line = log_line(url, referrer);
        let mut file = self.file.lock().await;

        let written = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        written.map_err(|e| {
            HookRejection::new(
                self.name(),
                format!("cannot append to {}: {}", self.path.display(), e),
            )
        })
    }
}

/// Emits a log event for every visited item
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceVisitor;

#[async_trait]
impl Visitor for TraceVisitor {
    fn name(&self) -> &'static str {
        "trace"
    }

    async fn visit(&self, url: &str, referrer: &str, _ctx: &HookContext) -> Result<(), HookRejection> {
        tracing::info!(url, referrer, "Visited");
        Ok(())
    }
}
