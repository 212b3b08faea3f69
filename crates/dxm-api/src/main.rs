//! # dxm-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the interior directory.
//! Binds to configurable port (default 8080).

use dxm_api::state::{AppConfig, AppState, LogFormat};
use dxm_webhook::LeadWebhook;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let webhook = LeadWebhook::from_env().map_err(|e| {
        tracing::error!("Lead webhook configuration invalid: {e}");
        e
    })?;
    if webhook.is_configured() {
        tracing::info!(mode = %webhook.config().mode, "Lead webhook configured");
    } else {
        tracing::warn!(
            "DXM_WEBHOOK_URL not set. Lead submissions will be refused with a configuration diagnostic."
        );
    }

    let port = config.port;
    let state = AppState::from_config(config, webhook).map_err(|e| {
        tracing::error!("Record source initialization failed: {e}");
        e
    })?;
    tracing::info!(source = %state.source.describe(), "Company records source");

    let app = dxm_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("DXM API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
