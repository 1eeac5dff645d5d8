use serde::Deserialize;

/// Main configuration structure for Crawly
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub seeds: SeedsConfig,
}

/// Worker pools, pacing and transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of intake workers running the acceptor chain
    #[serde(default = "default_producers")]
    pub producers: usize,

    /// Number of fetch workers
    #[serde(default = "default_fetchers")]
    pub fetchers: usize,

    /// Number of link extraction workers
    #[serde(default = "default_extractors")]
    pub extractors: usize,

    /// Fixed pause after each processed item (milliseconds)
    #[serde(rename = "throttle-ms", default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Size of the chunks response bodies are read in (bytes)
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// How long shutdown waits for workers before aborting them (milliseconds)
    #[serde(rename = "shutdown-grace-ms", default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory downloads are mirrored into
    #[serde(default = "default_output_root")]
    pub root: String,

    /// Append-only log of visited URLs (used by the `visited-log` visitor)
    #[serde(rename = "visited-log", default)]
    pub visited_log: Option<String>,

    /// Log file; logs go to stderr when unset
    #[serde(rename = "log-file", default)]
    pub log_file: Option<String>,

    /// Where to export the referrer index after the crawl
    #[serde(rename = "link-graph", default)]
    pub link_graph: Option<String>,
}

/// Names of the built-in hooks making up each chain, in order
#[derive(Debug, Clone, Deserialize)]
pub struct HooksConfig {
    #[serde(default = "default_acceptors")]
    pub acceptors: Vec<String>,

    #[serde(default)]
    pub visitors: Vec<String>,

    #[serde(default = "default_cleaners")]
    pub cleaners: Vec<String>,

    #[serde(default = "default_validators")]
    pub validators: Vec<String>,

    #[serde(rename = "download-handlers", default = "default_download_handlers")]
    pub download_handlers: Vec<String>,

    #[serde(rename = "parsing-handlers", default)]
    pub parsing_handlers: Vec<String>,
}

/// Where the initial URLs come from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedsConfig {
    /// Newline-delimited seed file
    #[serde(default)]
    pub file: Option<String>,

    /// Inline seed URLs
    #[serde(default)]
    pub urls: Vec<String>,
}

fn default_producers() -> usize {
    1
}

fn default_fetchers() -> usize {
    3
}

fn default_extractors() -> usize {
    3
}

fn default_throttle_ms() -> u64 {
    10
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

fn default_crawler_name() -> String {
    "crawly".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_root() -> String {
    "./output".to_string()
}

fn default_acceptors() -> Vec<String> {
    vec!["history".to_string()]
}

fn default_cleaners() -> Vec<String> {
    vec!["strip-fragment".to_string()]
}

fn default_validators() -> Vec<String> {
    vec!["web-scheme".to_string()]
}

fn default_download_handlers() -> Vec<String> {
    vec!["mirror".to_string()]
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            producers: default_producers(),
            fetchers: default_fetchers(),
            extractors: default_extractors(),
            throttle_ms: default_throttle_ms(),
            chunk_size: default_chunk_size(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header
    ///
    /// `Name/Version`, followed by `(+ContactURL; ContactEmail)` when either is set.
    pub fn header_value(&self) -> String {
        let contacts: Vec<String> = self
            .contact_url
            .iter()
            .map(|url| format!("+{}", url))
            .chain(self.contact_email.iter().cloned())
            .collect();

        if contacts.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contacts.join("; ")
            )
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            visited_log: None,
            log_file: None,
            link_graph: None,
        }
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            acceptors: default_acceptors(),
            visitors: Vec::new(),
            cleaners: default_cleaners(),
            validators: default_validators(),
            download_handlers: default_download_handlers(),
            parsing_handlers: Vec::new(),
        }
    }
}
