use crate::url::{Classification, ContentKind};
use crate::UrlError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Extension used for synthesized file names when no media type is known
const FALLBACK_EXTENSION: &str = "bin";

/// A parsed URL together with its content classification
///
/// The classification starts out empty and is set exactly once, by the
/// metadata probe in the fetch stage. After that it is plain data.
#[derive(Debug, Clone)]
pub struct Identity {
    url: Url,
    classification: Option<Classification>,
}

/// Where a resource is stored, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath {
    /// Directory relative to the output root (netloc, path segment, query)
    pub directory: PathBuf,
    /// File name inside `directory`
    pub file: String,
}

impl StoragePath {
    /// Absolute directory under the given output root
    pub fn directory_under(&self, root: &Path) -> PathBuf {
        root.join(&self.directory)
    }

    /// Absolute file path under the given output root
    pub fn file_under(&self, root: &Path) -> PathBuf {
        self.directory_under(root).join(&self.file)
    }
}

impl Identity {
    /// Parses a URL string into an unclassified identity
    ///
    /// # Examples
    ///
    /// ```
    /// use crawly::url::Identity;
    ///
    /// let identity = Identity::parse("http://example.com/gallery/cat.jpg").unwrap();
    /// assert_eq!(identity.host(), Some("example.com"));
    /// assert_eq!(identity.basename(), "cat.jpg");
    /// assert_eq!(identity.extension(), Some("jpg"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let url = Url::parse(raw.trim()).map_err(|source| UrlError::Parse {
            url: raw.to_string(),
            source,
        })?;

        if url.host_str().is_none() {
            return Err(UrlError::MissingHost(raw.to_string()));
        }

        Ok(Self::from_url(url))
    }

    /// Wraps an already parsed URL
    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            classification: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Host plus an explicit port, e.g. `127.0.0.1:8080`
    pub fn netloc(&self) -> String {
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Non-empty path segments
    pub fn segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Last path component, empty for directory-like paths
    pub fn basename(&self) -> &str {
        self.path().rsplit('/').next().unwrap_or("")
    }

    /// Extension of the basename, if it has a non-empty one
    pub fn extension(&self) -> Option<&str> {
        self.basename()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query().filter(|q| !q.is_empty())
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// The content kind; unclassified identities count as unknown
    pub fn kind(&self) -> ContentKind {
        self.classification
            .as_ref()
            .map(|c| c.kind)
            .unwrap_or(ContentKind::Unknown)
    }

    /// Stores the classification if none is set yet
    ///
    /// Returns false (and keeps the existing value) if already classified.
    pub fn classify(&mut self, classification: Classification) -> bool {
        if self.classification.is_some() {
            return false;
        }
        self.classification = Some(classification);
        true
    }

    /// Computes the storage location of this resource
    ///
    /// The directory is `netloc/segment[/query]` with colons replaced by
    /// underscores. The file is the basename when it has an extension,
    /// otherwise `index.<ext>` derived from the classification.
    /// Empty, `.` and `..` components are dropped so the result never escapes
    /// the output root.
    pub fn storage_path(&self) -> StoragePath {
        let path = self.path();
        let basename = self.basename();
        let extension = self.extension();

        let segment = if !basename.is_empty() && extension.is_none() {
            path
        } else {
            dirname(path)
        };
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        let segment = segment.strip_suffix('/').unwrap_or(segment);

        let mut relative = self.netloc();
        if !segment.is_empty() {
            relative.push('/');
            relative.push_str(segment);
        }
        if let Some(query) = self.query() {
            relative.push('/');
            relative.push_str(query);
        }
        let relative = relative.replace(':', "_");

        let directory = relative
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .collect::<PathBuf>();

        let file = match extension {
            Some(_) => basename.to_string(),
            None => format!("index.{}", self.synthesized_extension()),
        };

        StoragePath { directory, file }
    }

    fn synthesized_extension(&self) -> &str {
        match &self.classification {
            Some(c) if c.kind == ContentKind::Hypertext => "html",
            Some(Classification {
                media_type: Some(media_type),
                ..
            }) => &media_type.sub,
            _ => FALLBACK_EXTENSION,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Everything before the last slash; `/` for top-level paths
fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}
