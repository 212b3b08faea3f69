//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Nothing here caches company records. Every directory view asks
//! [`AppState::records`] for a fresh load, and a failed load is an empty
//! directory rather than an error page.

use std::path::PathBuf;
use std::sync::Arc;

use dxm_core::{CompanyCollection, DirectoryPolicy, PageSize, Region};
use dxm_webhook::LeadWebhook;
use url::Url;

use crate::middleware::metrics::ApiMetrics;
use crate::source::{RecordSource, SourceError};
use crate::view::submission::SubmissionLedger;

/// Default public site URL used in `sitemap.xml`.
pub const DEFAULT_SITE_URL: &str = "https://doxtalk.co.kr";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Companies document on disk. Ignored when `companies_url` is set.
    pub companies_path: PathBuf,
    pub companies_url: Option<Url>,
    /// Root of the static assets (`logos/` lives here).
    pub public_dir: PathBuf,
    pub page_size: PageSize,
    /// Region dropped by the "exclude home region" toggle.
    pub home_region: Region,
    pub site_url: String,
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            companies_path: PathBuf::from("public/data/companies.json"),
            companies_url: None,
            public_dir: PathBuf::from("public"),
            page_size: PageSize::default(),
            home_region: Region::Seoul,
            site_url: DEFAULT_SITE_URL.to_string(),
            metrics_enabled: true,
            log_format: LogFormat::Text,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DXM_PORT` (default: 8080)
    /// - `DXM_COMPANIES_PATH` (default: `public/data/companies.json`)
    /// - `DXM_COMPANIES_URL` (optional, overrides the path)
    /// - `DXM_PUBLIC_DIR` (default: `public`)
    /// - `DXM_PAGE_SIZE` (default: 20)
    /// - `DXM_HOME_REGION` (default: 서울)
    /// - `DXM_SITE_URL` (default: `https://doxtalk.co.kr`)
    /// - `DXM_METRICS_ENABLED` (enabled unless `false`)
    /// - `DXM_LOG_FORMAT` (`json` or text)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("DXM_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DXM_PORT", raw))?,
            None => defaults.port,
        };

        let page_size = match get("DXM_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| PageSize::new(n).ok())
                .ok_or(ConfigError::InvalidValue("DXM_PAGE_SIZE", raw))?,
            None => defaults.page_size,
        };

        let home_region = match get("DXM_HOME_REGION") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DXM_HOME_REGION", raw))?,
            None => defaults.home_region,
        };

        let companies_url = get("DXM_COMPANIES_URL")
            .map(|raw| {
                Url::parse(raw.trim())
                    .map_err(|e| ConfigError::InvalidUrl("DXM_COMPANIES_URL", e.to_string()))
            })
            .transpose()?;

        let site_url = match get("DXM_SITE_URL") {
            Some(raw) => {
                Url::parse(raw.trim())
                    .map_err(|e| ConfigError::InvalidUrl("DXM_SITE_URL", e.to_string()))?;
                raw.trim().trim_end_matches('/').to_string()
            }
            None => defaults.site_url,
        };

        Ok(Self {
            port,
            companies_path: get("DXM_COMPANIES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.companies_path),
            companies_url,
            public_dir: get("DXM_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            page_size,
            home_region,
            site_url,
            metrics_enabled: lookup("DXM_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            log_format: match get("DXM_LOG_FORMAT").as_deref().map(str::trim) {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    /// Engine parameters derived from configuration.
    pub fn policy(&self) -> DirectoryPolicy {
        DirectoryPolicy {
            excluded_region: self.home_region,
            page_size: self.page_size,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub source: Arc<RecordSource>,
    pub webhook: LeadWebhook,
    pub metrics: ApiMetrics,
    /// Submission tokens already presented by form posts.
    pub submissions: SubmissionLedger,
}

impl AppState {
    pub fn new(config: AppConfig, source: RecordSource, webhook: LeadWebhook) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
            webhook,
            metrics: ApiMetrics::new(),
            submissions: SubmissionLedger::default(),
        }
    }

    /// Build the record source the configuration points at.
    pub fn from_config(config: AppConfig, webhook: LeadWebhook) -> Result<Self, SourceError> {
        let source = match &config.companies_url {
            Some(url) => RecordSource::http(url.clone())?,
            None => RecordSource::file(config.companies_path.clone()),
        };
        Ok(Self::new(config, source, webhook))
    }

    pub fn policy(&self) -> DirectoryPolicy {
        self.config.policy()
    }

    /// Load the current records, degrading to an empty collection.
    pub async fn records(&self) -> CompanyCollection {
        match self.source.load().await {
            Ok((collection, report)) => {
                for skipped in &report.skipped {
                    tracing::warn!(
                        index = skipped.index,
                        reason = %skipped.reason,
                        "skipped malformed company element"
                    );
                }
                if !report.duplicate_ids.is_empty() {
                    tracing::warn!(ids = ?report.duplicate_ids, "duplicate company ids; kept first occurrence");
                }
                self.metrics.set_directory_records(collection.len());
                collection
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "company records unavailable; showing empty directory"
                );
                self.metrics.record_source_failure();
                CompanyCollection::empty()
            }
        }
    }

    /// Whether the record source can currently be read.
    pub async fn source_ready(&self) -> Result<(), SourceError> {
        self.source.load().await.map(|_| ())
    }
}
