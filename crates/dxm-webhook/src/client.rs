//! Lead webhook client.

use std::time::Instant;

use dxm_core::Envelope;
use url::Url;

use crate::config::{DeliveryMode, WebhookConfig};
use crate::error::WebhookError;

/// What the endpoint said about a delivered lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Response status. Recorded but not judged in fire-and-forget mode.
    pub status: u16,
    pub elapsed_ms: u64,
}

/// Posts lead envelopes to the configured endpoint.
///
/// Cheap to clone; clones share the underlying connection pool. There are
/// no retries: a failed delivery is reported once and the submitter decides
/// whether to send again.
#[derive(Debug, Clone)]
pub struct LeadWebhook {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl LeadWebhook {
    pub fn new(config: WebhookConfig) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(WebhookError::ClientInit)?;
        Ok(Self { http, config })
    }

    /// Build from `DXM_WEBHOOK_*` environment variables.
    pub fn from_env() -> Result<Self, WebhookError> {
        Self::new(WebhookConfig::from_env()?)
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Deliver one envelope.
    ///
    /// Without a configured URL this returns [`WebhookError::NotConfigured`]
    /// and performs no network call.
    pub async fn deliver(&self, envelope: &Envelope) -> Result<DeliveryReceipt, WebhookError> {
        let url = self.config.url.as_ref().ok_or(WebhookError::NotConfigured)?;
        let endpoint = endpoint_label(url);
        let started = Instant::now();

        let resp = self
            .http
            .post(url.clone())
            .json(envelope)
            .send()
            .await
            .map_err(|source| {
                tracing::warn!(
                    kind = %envelope.kind,
                    endpoint = %endpoint,
                    timeout = source.is_timeout(),
                    "lead delivery failed"
                );
                WebhookError::Transport {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = resp.status();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if self.config.mode == DeliveryMode::Confirmed && !status.is_success() {
            tracing::warn!(
                kind = %envelope.kind,
                endpoint = %endpoint,
                status = status.as_u16(),
                "lead webhook rejected delivery"
            );
            return Err(WebhookError::Rejected {
                endpoint,
                status: status.as_u16(),
            });
        }

        tracing::info!(
            kind = %envelope.kind,
            endpoint = %endpoint,
            status = status.as_u16(),
            elapsed_ms,
            mode = %self.config.mode,
            "lead delivered"
        );
        Ok(DeliveryReceipt {
            status: status.as_u16(),
            elapsed_ms,
        })
    }
}

/// Scheme, host and port only. Webhook paths often embed deployment keys.
fn endpoint_label(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown-host");
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}
