//! Resource fetching
//!
//! The loaders only see the [`ResourceFetcher`] trait. Three implementations:
//! - [`HttpFetcher`]: GET against an HTTP origin, bypassing caches
//! - [`FileFetcher`]: reads from a local `public/` style folder
//! - [`MemoryFetcher`]: fixed in-memory table, for tests and demos
//!
//! A response with a non-success status is still `Ok`; only transport
//! failures (connection, timeout, I/O) are `Err`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("vasi/", env!("CARGO_PKG_VERSION"));

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Locator cannot be turned into a URL or path
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Local file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Body is not valid UTF-8 text
    #[error("Body is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Completed response: status code plus body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    status: u16,
    body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(404, Vec::new())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as UTF-8 text
    pub fn text(self) -> Result<String, FetchError> {
        Ok(String::from_utf8(self.body)?)
    }
}

/// Capability to retrieve a resource by locator
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Retrieve the current content of `locator`, never a cached copy
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches locators from an HTTP origin
///
/// Relative locators (`/data/x.xlsx`) are joined onto the origin; absolute
/// URLs are used as-is.
pub struct HttpFetcher {
    http_client: reqwest::Client,
    origin: reqwest::Url,
}

impl HttpFetcher {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, FetchError> {
        let origin = reqwest::Url::parse(origin)
            .map_err(|e| FetchError::InvalidLocator(format!("{}: {}", origin, e)))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            origin,
        })
    }

    pub fn origin(&self) -> &reqwest::Url {
        &self.origin
    }

    fn resolve(&self, locator: &str) -> Result<reqwest::Url, FetchError> {
        if let Ok(absolute) = reqwest::Url::parse(locator) {
            return Ok(absolute);
        }
        self.origin
            .join(locator)
            .map_err(|e| FetchError::InvalidLocator(format!("{}: {}", locator, e)))
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        let url = self.resolve(locator)?;
        debug!(%url, "GET");

        let response = self
            .http_client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchResponse::new(status.as_u16(), Vec::new()));
        }

        let body = response.bytes().await?;
        Ok(FetchResponse::new(status.as_u16(), body.to_vec()))
    }
}

// ============================================================================
// Local folder
// ============================================================================

/// Reads locators from a local folder laid out like the web root
///
/// The configured base path is stripped before resolving, so
/// `/sizing/data/x.xlsx` maps to `<root>/data/x.xlsx`. A missing file is
/// reported as status 404, matching what a static web server would answer.
pub struct FileFetcher {
    root: PathBuf,
    base_path: String,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>, base_path: &str) -> Self {
        Self {
            root: root.into(),
            base_path: base_path.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, FetchError> {
        let relative = locator
            .strip_prefix(self.base_path.as_str())
            .unwrap_or(locator)
            .trim_start_matches('/');

        let path = Path::new(relative);
        let escapes_root = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_empty() || escapes_root {
            return Err(FetchError::InvalidLocator(locator.to_string()));
        }

        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        let path = self.resolve(locator)?;
        debug!(path = %path.display(), "read");

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(FetchResponse::new(200, body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Clone)]
enum MemoryEntry {
    Response(FetchResponse),
    Failure(String),
}

/// Serves a fixed table of responses; unknown locators answer 404
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, MemoryEntry>,
    requests: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `locator` with the given status and body
    pub fn with_response(mut self, locator: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(
            locator.to_string(),
            MemoryEntry::Response(FetchResponse::new(status, body)),
        );
        self
    }

    /// Answer `locator` with status 200 and the given body
    pub fn with_body(self, locator: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_response(locator, 200, body)
    }

    /// Fail every fetch of `locator` with a network error
    pub fn with_failure(mut self, locator: &str, message: &str) -> Self {
        self.entries
            .insert(locator.to_string(), MemoryEntry::Failure(message.to_string()));
        self
    }

    /// Number of fetches issued for `locator` so far
    pub fn request_count(&self, locator: &str) -> usize {
        self.requests
            .lock()
            .map(|r| r.get(locator).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            *requests.entry(locator.to_string()).or_insert(0) += 1;
        }

        match self.entries.get(locator) {
            Some(MemoryEntry::Response(response)) => Ok(response.clone()),
            Some(MemoryEntry::Failure(message)) => Err(FetchError::Network(message.clone())),
            None => Ok(FetchResponse::not_found()),
        }
    }
}
