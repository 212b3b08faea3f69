//! # Company Record Source
//!
//! Where the companies document comes from. The document is read again on
//! every directory request so a freshly converted file or a redeployed
//! static asset shows up without a restart: files are re-read from disk and
//! HTTP fetches send `Cache-Control: no-cache`.
//!
//! Load failures are returned to the caller, which degrades to an empty
//! directory (see [`AppState::records`](crate::state::AppState::records)).

use std::path::{Path, PathBuf};
use std::time::Duration;

use dxm_core::{CompanyCollection, LoadReport};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use url::Url;

/// Timeout for fetching the document over HTTP.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors while reading the companies document.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("HTTP error fetching {url}: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("malformed companies document: {0}")]
    Malformed(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A place to load company records from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// JSON document on local disk.
    File(PathBuf),
    /// JSON document served over HTTP.
    Http { url: Url, client: reqwest::Client },
    /// Fixed in-memory collection.
    Static(CompanyCollection),
}

impl RecordSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn http(url: Url) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self::Http { url, client })
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => format!("file:{}", path.display()),
            Self::Http { url, .. } => url.to_string(),
            Self::Static(c) => format!("static:{} records", c.len()),
        }
    }

    /// Load and parse the document.
    ///
    /// A document that is not a JSON array is an error. Individual bad
    /// elements are not: they are skipped and listed in the report.
    pub async fn load(&self) -> Result<(CompanyCollection, LoadReport), SourceError> {
        let bytes = match self {
            Self::Static(c) => return Ok((c.clone(), LoadReport::default())),
            Self::File(path) => read_file(path).await?,
            Self::Http { url, client } => fetch(client, url).await?,
        };

        let (collection, report) = CompanyCollection::from_json_slice(&bytes);
        if let Some(err) = &report.document_error {
            return Err(SourceError::Malformed(err.clone()));
        }
        Ok((collection, report))
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

async fn fetch(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, SourceError> {
    let http_err = |source| SourceError::Http {
        url: url.to_string(),
        source,
    };
    let resp = client
        .get(url.clone())
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(http_err)?;

    if !resp.status().is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(http_err)?;
    Ok(bytes.to_vec())
}
