//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain and delivery errors to HTTP status codes and a JSON body
//! with error code, message, and optional details. Internal error text is
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dxm_core::{CoreError, LeadKind};
use dxm_webhook::WebhookError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "MISSING_FIELDS").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client-actionable errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Required lead fields are blank (422). Carries the field names.
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// No lead webhook endpoint configured (503). Nothing was sent.
    #[error("{0}")]
    WebhookNotConfigured(String),

    /// The lead could not be delivered (502). The submitted payload is
    /// echoed back so the client can resubmit without retyping.
    #[error("lead delivery failed for {kind}: {reason}")]
    LeadDelivery {
        kind: LeadKind,
        reason: String,
        payload: serde_json::Value,
    },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::MissingFields(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELDS"),
            Self::WebhookNotConfigured(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "WEBHOOK_NOT_CONFIGURED")
            }
            Self::LeadDelivery { .. } => (StatusCode::BAD_GATEWAY, "LEAD_DELIVERY_FAILED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Map a failed delivery to the response the submitter sees.
    pub fn from_delivery(kind: LeadKind, err: &WebhookError, payload: serde_json::Value) -> Self {
        match err {
            WebhookError::NotConfigured | WebhookError::Config(_) => {
                Self::WebhookNotConfigured(dxm_webhook::NOT_CONFIGURED_DIAGNOSTIC.to_string())
            }
            other => Self::LeadDelivery {
                kind,
                reason: other.to_string(),
                payload,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::LeadDelivery { .. } => tracing::error!(error = %self, "lead delivery error"),
            Self::WebhookNotConfigured(_) => {
                tracing::warn!(error = %self, "lead webhook not configured")
            }
            _ => {}
        }

        // Never expose internal or transport error text to clients.
        let (message, details) = match self {
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::MissingFields(fields) => (
                "필수 항목을 모두 입력해주세요.".to_string(),
                Some(serde_json::json!({ "missing": fields })),
            ),
            Self::LeadDelivery { kind, payload, .. } => (
                kind.retry_message().to_string(),
                Some(serde_json::json!({ "payload": payload })),
            ),
            Self::WebhookNotConfigured(diagnostic) => (diagnostic, None),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownLeadKind(_) => Self::NotFound(err.to_string()),
            CoreError::UnknownRegion(_) | CoreError::InvalidPageSize(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}
