//! HTTP fetcher implementation
//!
//! This module handles all HTTP traffic for the crawler:
//! - Building the HTTP client with the configured user agent and timeouts
//! - HEAD probes that classify a URL by its declared media type
//! - GET requests yielding a `Resource` whose body is read in fixed-size chunks
//! - Idempotent persistence of bodies under the output root

use crate::config::Config;
use crate::url::{Classification, ContentKind, Identity};
use crate::{FetchError, ProbeError};
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Default size of body chunks (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Result of persisting a resource body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The body was written to `path`
    Written { path: PathBuf, bytes: u64 },
    /// A file already existed at `path`; nothing was written
    AlreadyExists { path: PathBuf },
}

impl PersistOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::AlreadyExists { path } => path,
        }
    }
}

enum Body {
    Streaming {
        response: Response,
        pending: BytesMut,
        started: bool,
    },
    Buffered {
        bytes: Bytes,
        cursor: usize,
    },
    Consumed,
}

/// A fetched resource: identity, status, headers and body
///
/// Owned by one worker at a time. A streaming body can be read once; after
/// `buffer` the body stays in memory and can be read any number of times.
pub struct Resource {
    identity: Identity,
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    chunk_size: usize,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            Body::Streaming { .. } => "streaming",
            Body::Buffered { .. } => "buffered",
            Body::Consumed => "consumed",
        };
        f.debug_struct("Resource")
            .field("url", &self.identity.as_str())
            .field("status", &self.status)
            .field("kind", &self.identity.kind())
            .field("body", &body)
            .finish()
    }
}

impl Resource {
    fn from_response(identity: Identity, response: Response, chunk_size: usize) -> Self {
        Self {
            identity,
            status: response.status(),
            headers: response.headers().clone(),
            body: Body::Streaming {
                response,
                pending: BytesMut::new(),
                started: false,
            },
            chunk_size: chunk_size.max(1),
        }
    }

    /// Builds an already-buffered `200 OK` resource
    pub fn from_bytes(identity: Identity, body: impl Into<Bytes>) -> Self {
        Self {
            identity,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Body::Buffered {
                bytes: body.into(),
                cursor: 0,
            },
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn url(&self) -> &str {
        self.identity.as_str()
    }

    pub fn kind(&self) -> ContentKind {
        self.identity.kind()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self.body, Body::Buffered { .. })
    }

    /// Reads the next chunk of at most `chunk-size` bytes
    ///
    /// Returns `Ok(None)` at the end of the body. For a buffered body the
    /// chunk cursor advances but the bytes stay available to `text` and
    /// `persist`.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        let chunk_size = self.chunk_size;
        match &mut self.body {
            Body::Streaming {
                response,
                pending,
                started,
            } => {
                *started = true;
                let mut finished = false;
                while pending.len() < chunk_size {
                    let next = response.chunk().await.map_err(|source| FetchError::Body {
                        url: self.identity.as_str().to_string(),
                        source,
                    })?;
                    match next {
                        Some(bytes) => pending.extend_from_slice(&bytes),
                        None => {
                            finished = true;
                            break;
                        }
                    }
                }

                if pending.is_empty() && finished {
                    self.body = Body::Consumed;
                    return Ok(None);
                }

                let take = pending.len().min(chunk_size);
                Ok(Some(pending.split_to(take).freeze()))
            }
            Body::Buffered { bytes, cursor } => {
                if *cursor >= bytes.len() {
                    return Ok(None);
                }
                let end = (*cursor + chunk_size).min(bytes.len());
                let chunk = bytes.slice(*cursor..end);
                *cursor = end;
                Ok(Some(chunk))
            }
            Body::Consumed => Err(self.consumed()),
        }
    }

    /// Reads the whole body into memory
    pub async fn buffer(&mut self) -> Result<Bytes, FetchError> {
        match &self.body {
            Body::Buffered { bytes, .. } => return Ok(bytes.clone()),
            Body::Streaming { started: true, .. } | Body::Consumed => {
                return Err(self.consumed())
            }
            Body::Streaming { .. } => {}
        }

        let mut collected = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await? {
            collected.extend_from_slice(&chunk);
        }

        let bytes = collected.freeze();
        self.body = Body::Buffered {
            bytes: bytes.clone(),
            cursor: 0,
        };
        Ok(bytes)
    }

    /// The buffered body decoded as text (invalid UTF-8 is replaced)
    pub fn text(&self) -> Result<String, FetchError> {
        match &self.body {
            Body::Buffered { bytes, .. } => Ok(String::from_utf8_lossy(bytes).into_owned()),
            _ => Err(self.consumed()),
        }
    }

    /// Writes the body to its storage path under `root`
    ///
    /// Never overwrites: an existing file yields `PersistOutcome::AlreadyExists`.
    /// A buffered body is written from memory and stays available; a streaming
    /// body is copied chunk by chunk and consumed.
    pub async fn persist(&mut self, root: &Path) -> Result<PersistOutcome, FetchError> {
        let storage = self.identity.storage_path();
        let directory = storage.directory_under(root);
        let path = storage.file_under(root);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(PersistOutcome::AlreadyExists { path });
        }

        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|source| self.persist_error(&path, source))?;

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Ok(PersistOutcome::AlreadyExists { path });
            }
            Err(e) => return Err(self.persist_error(&path, e)),
        };

        match self.write_body(&mut file, &path).await {
            Ok(bytes) => Ok(PersistOutcome::Written { path, bytes }),
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    async fn write_body(&mut self, file: &mut tokio::fs::File, path: &Path) -> Result<u64, FetchError> {
        let mut written = 0u64;

        if let Body::Buffered { bytes, .. } = &self.body {
            let bytes = bytes.clone();
            file.write_all(&bytes)
                .await
                .map_err(|source| self.persist_error(path, source))?;
            written = bytes.len() as u64;
        } else {
            while let Some(chunk) = self.next_chunk().await? {
                file.write_all(&chunk)
                    .await
                    .map_err(|source| self.persist_error(path, source))?;
                written += chunk.len() as u64;
            }
        }

        file.flush()
            .await
            .map_err(|source| self.persist_error(path, source))?;
        Ok(written)
    }

    fn consumed(&self) -> FetchError {
        FetchError::BodyConsumed {
            url: self.identity.as_str().to_string(),
        }
    }

    fn persist_error(&self, path: &Path, source: std::io::Error) -> FetchError {
        FetchError::Persist {
            url: self.identity.as_str().to_string(),
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent follows `Name/Version (+ContactURL; ContactEmail)`; redirects
/// are followed up to `max-redirects` hops.
///
/// # Example
///
/// ```no_run
/// use crawly::config::Config;
/// use crawly::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::limited(config.crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues probes and retrievals with one shared client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    chunk_size: usize,
}

impl Fetcher {
    pub fn new(client: Client, chunk_size: usize) -> Self {
        Self { client, chunk_size }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.crawler.chunk_size))
    }

    /// Classifies an identity from a HEAD request, once
    ///
    /// Already-classified identities are left alone. A failed probe is logged
    /// and classifies the URL as unknown.
    pub async fn probe(&self, identity: &mut Identity) -> ContentKind {
        if identity.is_classified() {
            return identity.kind();
        }

        let classification = match self.head_content_type(identity.as_str()).await {
            Ok(content_type) => Classification::from_content_type(content_type.as_deref()),
            Err(e) => {
                tracing::warn!(url = %identity, error = %e, "Metadata probe failed");
                Classification::unknown()
            }
        };

        tracing::debug!(
            url = %identity,
            kind = %classification.kind,
            media_type = ?classification.media_type.as_ref().map(|m| m.to_string()),
            "Classified"
        );
        identity.classify(classification);
        identity.kind()
    }

    async fn head_content_type(&self, url: &str) -> Result<Option<String>, ProbeError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|source| ProbeError {
                url: url.to_string(),
                source,
            })?;

        Ok(response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string))
    }

    /// Retrieves a URL, returning the response with its body unread
    ///
    /// Transport failures are returned as `FetchError::Transport`; there are
    /// no retries. Non-success statuses are not errors here.
    pub async fn fetch(&self, identity: Identity) -> Result<Resource, FetchError> {
        let response = self
            .client
            .get(identity.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: identity.as_str().to_string(),
                source,
            })?;

        Ok(Resource::from_response(identity, response, self.chunk_size))
    }
}
