//! # Lead API
//!
//! Routes:
//! - GET  /v1/forms/:kind: ordered field definitions for a lead form
//! - POST /v1/leads/:kind: validate a lead and relay it to the webhook
//!
//! `kind` is `quote` or `vendor_register`. A lead is relayed at most once
//! per request; there is no retry queue. When delivery fails the submitted
//! values are echoed back so the client can resubmit them unchanged.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dxm_core::{FieldSpec, FormError, LeadForm, LeadKind, SubmissionMeta};
use dxm_webhook::WebhookError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, RequestMeta, Validate};
use crate::middleware::metrics::LeadOutcome;
use crate::state::AppState;
use crate::view::form::LeadFormController;
use crate::view::lifecycle::ViewScope;

/// Longest accepted value for a single field, in characters.
const MAX_FIELD_CHARS: usize = 2000;
/// Upper bound on submitted keys, known or not.
const MAX_PAYLOAD_KEYS: usize = 64;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/forms/:kind", get(get_form))
        .route("/v1/leads/:kind", post(submit_lead))
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// One input of a lead form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldDto {
    /// Payload key.
    pub name: String,
    pub label: String,
    pub placeholder: String,
}

impl From<&FieldSpec> for FieldDto {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            label: spec.label.to_string(),
            placeholder: spec.placeholder.to_string(),
        }
    }
}

/// Lead form definition. Every field is required.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormDefinition {
    pub kind: String,
    pub fields: Vec<FieldDto>,
}

/// Where the lead was submitted from.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MetaDto {
    #[serde(default)]
    pub page: String,
    #[serde(default, rename = "userAgent")]
    pub user_agent: String,
}

/// Lead submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LeadRequest {
    /// Field values keyed by field name. Unknown keys are ignored.
    pub payload: HashMap<String, String>,
    /// Defaults to the `Referer` and `User-Agent` headers.
    #[serde(default)]
    pub meta: Option<MetaDto>,
}

impl Validate for LeadRequest {
    fn validate(&self) -> Result<(), String> {
        if self.payload.len() > MAX_PAYLOAD_KEYS {
            return Err(format!("payload must have at most {MAX_PAYLOAD_KEYS} keys"));
        }
        if let Some((name, _)) = self
            .payload
            .iter()
            .find(|(_, v)| v.chars().count() > MAX_FIELD_CHARS)
        {
            return Err(format!("{name} must be at most {MAX_FIELD_CHARS} characters"));
        }
        Ok(())
    }
}

/// Accepted lead, with the confirmation copy to show.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadAccepted {
    pub kind: String,
    pub title: String,
    pub description: String,
    /// Webhook response status.
    pub webhook_status: u16,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /v1/forms/:kind — Lead form definition.
#[utoipa::path(
    get,
    path = "/v1/forms/{kind}",
    params(("kind" = String, Path, description = "quote | vendor_register")),
    responses(
        (status = 200, description = "Ordered field definitions", body = FormDefinition),
        (status = 404, description = "Unknown form kind", body = crate::error::ErrorBody),
    ),
    tag = "leads"
)]
async fn get_form(Path(kind): Path<String>) -> Result<Json<FormDefinition>, AppError> {
    let kind: LeadKind = kind.parse()?;
    Ok(Json(FormDefinition {
        kind: kind.as_str().to_string(),
        fields: kind.fields().iter().map(FieldDto::from).collect(),
    }))
}

/// POST /v1/leads/:kind — Submit a lead.
#[utoipa::path(
    post,
    path = "/v1/leads/{kind}",
    params(("kind" = String, Path, description = "quote | vendor_register")),
    request_body = LeadRequest,
    responses(
        (status = 202, description = "Lead relayed", body = LeadAccepted),
        (status = 404, description = "Unknown form kind", body = crate::error::ErrorBody),
        (status = 422, description = "Required fields are blank", body = crate::error::ErrorBody),
        (status = 502, description = "Delivery failed; payload echoed back", body = crate::error::ErrorBody),
        (status = 503, description = "No webhook endpoint configured", body = crate::error::ErrorBody),
    ),
    tag = "leads"
)]
async fn submit_lead(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RequestMeta(header_meta): RequestMeta,
    body: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LeadAccepted>), AppError> {
    let kind: LeadKind = kind.parse()?;
    let request = extract_validated_json(body)?;

    let meta = match request.meta {
        Some(m) => SubmissionMeta {
            page: m.page,
            user_agent: m.user_agent,
        },
        None => header_meta,
    };
    let form = LeadForm::from_pairs(
        kind,
        request
            .payload
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    let echoed = serde_json::to_value(form.payload())
        .map_err(|e| AppError::Internal(format!("payload serialization: {e}")))?;

    let scope = ViewScope::new("lead");
    let controller = LeadFormController::new(form);
    let delivery = match controller.submit(&scope, state.webhook.clone(), meta) {
        Ok(handle) => handle,
        Err(FormError::MissingFields(missing)) => {
            state.metrics.record_lead(kind, LeadOutcome::MissingFields);
            return Err(AppError::MissingFields(missing));
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    let result = delivery
        .await
        .map_err(|e| AppError::Internal(format!("delivery task: {e}")))?;

    match result {
        Ok(receipt) => {
            state.metrics.record_lead(kind, LeadOutcome::Sent);
            tracing::info!(kind = %kind, status = receipt.status, "lead relayed");
            let confirmation = kind.confirmation();
            Ok((
                StatusCode::ACCEPTED,
                Json(LeadAccepted {
                    kind: kind.as_str().to_string(),
                    title: confirmation.title.to_string(),
                    description: confirmation.description.to_string(),
                    webhook_status: receipt.status,
                    elapsed_ms: receipt.elapsed_ms,
                }),
            ))
        }
        Err(e) => {
            let outcome = if matches!(e, WebhookError::NotConfigured) {
                LeadOutcome::NotConfigured
            } else {
                LeadOutcome::Failed
            };
            state.metrics.record_lead(kind, outcome);
            Err(AppError::from_delivery(kind, &e, echoed))
        }
    }
}
