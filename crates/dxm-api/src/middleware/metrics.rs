//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Lead outcomes and record-source failures are pushed from the
//! handlers that observe them. The directory size gauge is set on each
//! successful record load.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use dxm_core::LeadKind;
use prometheus::{
    core::Collector, Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Outcome label values for `dxm_leads_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOutcome {
    Sent,
    MissingFields,
    NotConfigured,
    Failed,
    /// A form post repeated a submission token; nothing was relayed.
    Duplicate,
}

impl LeadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::MissingFields => "missing_fields",
            Self::NotConfigured => "not_configured",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    leads_total: IntCounterVec,
    record_source_failures_total: IntCounter,
    directory_records: IntGauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("dxm_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dxm_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("dxm_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let leads_total = IntCounterVec::new(
            Opts::new("dxm_leads_total", "Lead submissions by form and outcome"),
            &["kind", "outcome"],
        )
        .expect("metric can be created");

        let record_source_failures_total = IntCounter::new(
            "dxm_record_source_failures_total",
            "Company document loads that degraded to an empty directory",
        )
        .expect("metric can be created");

        let directory_records = IntGauge::new(
            "dxm_directory_records",
            "Company records in the most recent successful load",
        )
        .expect("metric can be created");

        let collectors: [Box<dyn Collector>; 6] = [
            Box::new(http_requests_total.clone()),
            Box::new(http_request_duration_seconds.clone()),
            Box::new(http_errors_total.clone()),
            Box::new(leads_total.clone()),
            Box::new(record_source_failures_total.clone()),
            Box::new(directory_records.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .expect("metric can be registered");
        }

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                leads_total,
                record_source_failures_total,
                directory_records,
            }),
        }
    }

    /// Total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        sum_counters(&self.inner.http_requests_total)
    }

    /// Total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        sum_counters(&self.inner.http_errors_total)
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    pub fn record_lead(&self, kind: LeadKind, outcome: LeadOutcome) {
        self.inner
            .leads_total
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .inc();
    }

    pub fn leads(&self, kind: LeadKind, outcome: LeadOutcome) -> u64 {
        self.inner
            .leads_total
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .get()
    }

    pub fn record_source_failure(&self) {
        self.inner.record_source_failures_total.inc();
    }

    pub fn record_source_failures(&self) -> u64 {
        self.inner.record_source_failures_total.get()
    }

    pub fn set_directory_records(&self, count: usize) {
        self.inner
            .directory_records
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counters(counter: &IntCounterVec) -> u64 {
    counter
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

/// Static routes reported under their own path label.
const KNOWN_PATHS: &[&str] = &[
    "/",
    "/directory",
    "/quote",
    "/register",
    "/terms",
    "/sitemap-page",
    "/sitemap.xml",
    "/openapi.json",
    "/metrics",
    "/health/liveness",
    "/health/readiness",
    "/v1/regions",
    "/v1/companies",
];

/// Collapse a request path to a bounded label set.
///
/// Lead kinds are kept when valid; anything else is grouped so scanners
/// cannot inflate label cardinality.
fn normalize_path(path: &str) -> String {
    if KNOWN_PATHS.contains(&path) {
        return path.to_string();
    }
    for prefix in ["/v1/forms/", "/v1/leads/"] {
        if let Some(kind) = path.strip_prefix(prefix) {
            return match kind.parse::<LeadKind>() {
                Ok(kind) => format!("{prefix}{kind}"),
                Err(_) => format!("{prefix}{{kind}}"),
            };
        }
    }
    if path.starts_with("/logos/") {
        return "/logos/{file}".to_string();
    }
    "/{unmatched}".to_string()
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}
