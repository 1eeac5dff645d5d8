use crate::config::SeedsConfig;
use crate::url::ensure_scheme;
use crate::{CrawlyError, CrawlyResult};
use std::path::PathBuf;

/// Where the initial URLs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// Newline-delimited file; `#` comments and blank lines are skipped
    File(PathBuf),
    /// In-memory list
    Urls(Vec<String>),
}

impl Default for SeedSource {
    fn default() -> Self {
        Self::Urls(Vec::new())
    }
}

impl SeedSource {
    pub fn from_config(config: &SeedsConfig) -> Self {
        match &config.file {
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::Urls(config.urls.clone()),
        }
    }

    /// Reads the seeds, prefixing `http://` where no web scheme is given
    pub async fn load(&self) -> CrawlyResult<Vec<String>> {
        match self {
            Self::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CrawlyError::Seeds {
                        path: path.clone(),
                        source,
                    })?;
                Ok(parse_seed_lines(&content))
            }
            Self::Urls(urls) => Ok(urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(ensure_scheme)
                .collect()),
        }
    }
}

/// Parses seed file content
pub fn parse_seed_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ensure_scheme)
        .collect()
}
