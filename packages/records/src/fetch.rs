//! Byte sources for incident and geometry files.
//!
//! Everything the engine loads goes through a [`SourceReader`], so the same
//! loaders work against a local data directory, a static web host, or an
//! in-memory table in tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::{RecordsError, retry};

/// Reads the raw bytes behind a source URI.
///
/// URIs are either absolute `http(s)://` URLs or paths such as
/// `/CSVs/Base_Desap_TasaValores.csv` that the reader resolves against its
/// own root.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Fetches the full contents of `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the source is missing or the transfer
    /// fails.
    async fn read(&self, uri: &str) -> Result<Vec<u8>, RecordsError>;
}

/// Whether `uri` should be fetched over the network.
#[must_use]
pub fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Reads paths relative to a local data directory.
#[derive(Debug, Clone)]
pub struct FileReader {
    root: PathBuf,
}

impl FileReader {
    /// Creates a reader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `uri` against the root. A leading `/` is relative to the
    /// root, not the filesystem.
    #[must_use]
    pub fn resolve(&self, uri: &str) -> PathBuf {
        self.root.join(uri.trim_start_matches('/'))
    }
}

#[async_trait]
impl SourceReader for FileReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, RecordsError> {
        let path = self.resolve(uri);
        log::debug!("Reading {}", path.display());
        Ok(tokio::fs::read(&path).await?)
    }
}

/// Fetches over HTTP(S), optionally relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpReader {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpReader {
    /// Creates a reader. Relative URIs are joined onto `base_url` when
    /// given.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
        }
    }

    fn url_for(&self, uri: &str) -> String {
        if is_remote(uri) {
            return uri.to_string();
        }
        match &self.base_url {
            Some(base) => format!("{base}/{}", uri.trim_start_matches('/')),
            None => uri.to_string(),
        }
    }
}

#[async_trait]
impl SourceReader for HttpReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, RecordsError> {
        let url = self.url_for(uri);
        log::debug!("Fetching {url}");
        retry::send_bytes(|| self.client.get(&url)).await
    }
}

/// Sends absolute URLs to an [`HttpReader`] and everything else to a
/// [`FileReader`].
#[derive(Debug, Clone)]
pub struct DispatchReader {
    files: FileReader,
    http: HttpReader,
}

impl DispatchReader {
    /// Creates a dispatching reader over a local data root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            files: FileReader::new(root),
            http: HttpReader::new(None),
        }
    }
}

#[async_trait]
impl SourceReader for DispatchReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, RecordsError> {
        if is_remote(uri) {
            self.http.read(uri).await
        } else {
            self.files.read(uri).await
        }
    }
}

/// In-memory sources with optional per-URI latency.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    entries: BTreeMap<String, (Vec<u8>, Duration)>,
}

impl MemoryReader {
    /// Creates an empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source served immediately.
    #[must_use]
    pub fn with(self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_delay(uri, bytes, Duration::ZERO)
    }

    /// Adds a source served after `delay`.
    #[must_use]
    pub fn with_delay(
        mut self,
        uri: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        delay: Duration,
    ) -> Self {
        self.entries.insert(uri.into(), (bytes.into(), delay));
        self
    }
}

#[async_trait]
impl SourceReader for MemoryReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, RecordsError> {
        let Some((bytes, delay)) = self.entries.get(uri) else {
            return Err(RecordsError::Source {
                uri: uri.to_string(),
                message: "not found".to_string(),
            });
        };
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }
        Ok(bytes.clone())
    }
}
