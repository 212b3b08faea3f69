//! Webhook delivery error types.

use dxm_core::FormOutcome;

/// Shown to the submitter when no webhook endpoint is configured.
pub const NOT_CONFIGURED_DIAGNOSTIC: &str =
    "전송 주소가 없습니다. DXM_WEBHOOK_URL 설정을 확인해주세요.";

/// Errors from a lead delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// No endpoint configured. Nothing was sent.
    #[error("lead webhook URL is not configured")]
    NotConfigured,
    /// The request could not be dispatched (DNS, connect, timeout).
    #[error("HTTP error posting lead to {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-2xx status. Only reported in
    /// confirmed mode.
    #[error("lead webhook {endpoint} returned {status}")]
    Rejected { endpoint: String, status: u16 },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl WebhookError {
    /// How the submitting form should react to this error.
    pub fn form_outcome(&self) -> FormOutcome {
        match self {
            Self::NotConfigured | Self::Config(_) => FormOutcome::NotConfigured {
                diagnostic: NOT_CONFIGURED_DIAGNOSTIC.to_string(),
            },
            Self::Transport { .. } | Self::Rejected { .. } | Self::ClientInit(_) => {
                FormOutcome::TransportFailed
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured | Self::Config(_) => "not_configured",
            Self::Transport { .. } | Self::ClientInit(_) => "transport",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_maps_to_diagnostic() {
        match WebhookError::NotConfigured.form_outcome() {
            FormOutcome::NotConfigured { diagnostic } => {
                assert!(diagnostic.contains("DXM_WEBHOOK_URL"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn rejection_is_retryable_failure() {
        let err = WebhookError::Rejected {
            endpoint: "https://hook.example.com".into(),
            status: 500,
        };
        assert_eq!(err.form_outcome(), FormOutcome::TransportFailed);
        assert_eq!(err.kind(), "rejected");
        assert!(err.to_string().contains("500"));
    }
}
