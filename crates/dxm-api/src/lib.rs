//! # dxm-api — Axum Service for the Interior Directory
//!
//! Serves the DOXMEET hospital interior directory: server-rendered pages,
//! a JSON API over the same filter engine, and the relay that forwards
//! quote and vendor registration leads to the configured webhook.
//!
//! ## Surface
//!
//! | Path                  | Module                    | Kind           |
//! |-----------------------|---------------------------|----------------|
//! | `/`, `/directory`     | [`routes::pages`]         | HTML directory |
//! | `/quote`, `/register` | [`routes::pages`]         | HTML forms     |
//! | `/terms`, `/sitemap-page`, `/sitemap.xml` | [`routes::pages`] | static |
//! | `/v1/regions`, `/v1/companies` | [`routes::directory`] | JSON    |
//! | `/v1/forms/*`, `/v1/leads/*`   | [`routes::leads`]     | JSON    |
//! | `/openapi.json`       | [`openapi`]               | JSON           |
//! | `/logos/*`            | `tower_http::services::ServeDir` | assets  |
//! | `/health/*`, `/metrics` | this module             | probes         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - Filtering, pagination and form rules live in `dxm-core`; handlers only
//!   parse, call and render.
//! - All JSON errors map to structured responses via [`AppError`].
//! - A record source failure is an empty directory, never an error page.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod source;
pub mod state;
pub mod view;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Largest accepted request body. Lead forms are a few hundred bytes.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.config.metrics_enabled;
    let logos = ServeDir::new(state.config.public_dir.join("logos"));

    let mut site = Router::new()
        .merge(routes::pages::router())
        .merge(routes::directory::router())
        .merge(routes::leads::router())
        .merge(openapi::router())
        .nest_service("/logos", logos)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    if metrics_on {
        site = site
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(axum::Extension(state.metrics.clone()));
    }

    let site = site
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        probes = probes.route("/metrics", axum::routing::get(prometheus_metrics));
    }

    Router::new().merge(probes.with_state(state)).merge(site)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 "ready" when the record source can be read,
/// 503 with a diagnostic otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.source_ready().await {
        Ok(()) => (StatusCode::OK, "ready".to_string()).into_response(),
        Err(e) => {
            tracing::warn!(source = %state.source.describe(), error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("record source unavailable: {e}"),
            )
                .into_response()
        }
    }
}
