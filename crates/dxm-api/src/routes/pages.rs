//! # HTML Pages
//!
//! Routes:
//! - GET /: directory with search, region filters and pagination
//! - GET /directory: permanent redirect to `/`
//! - GET, POST /quote: quote request form
//! - GET, POST /register: vendor registration form
//! - GET /terms, /sitemap-page, /sitemap.xml
//!
//! Form pages post back to themselves. The response re-renders the form
//! with the confirmation dialog, the configuration diagnostic or the retry
//! message, depending on how delivery went. A post that repeats an earlier
//! submission token is answered with 409 and the earlier post's view, and
//! nothing is relayed again.

use std::collections::HashMap;

use axum::extract::{RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::{Form, Router};
use dxm_core::{select, FormError, LeadForm, LeadFormMachine, LeadKind};
use dxm_webhook::WebhookError;

use crate::extractors::{FilterQuery, RequestMeta};
use crate::middleware::metrics::LeadOutcome;
use crate::state::AppState;
use crate::view::directory::DirectoryController;
use crate::view::form::LeadFormController;
use crate::view::lifecycle::ViewScope;
use crate::view::render;
use crate::view::submission::{Claim, SubmissionLedger, TOKEN_FIELD};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(directory))
        .route("/directory", get(directory_redirect))
        .route("/quote", get(quote_form).post(submit_quote))
        .route("/register", get(register_form).post(submit_register))
        .route("/terms", get(terms))
        .route("/sitemap-page", get(sitemap_page))
        .route("/sitemap.xml", get(sitemap_xml))
}

async fn directory(State(state): State<AppState>, FilterQuery(filter): FilterQuery) -> Html<String> {
    let scope = ViewScope::new("directory");
    let controller = DirectoryController::new(filter);

    let loader = state.clone();
    let load = controller.mount(&scope, async move { loader.records().await });
    if let Err(e) = load.await {
        tracing::warn!(error = %e, "directory load task failed");
    }

    let snapshot = controller.snapshot();
    let records = snapshot.records_or_empty();
    let policy = state.policy();
    let selection = snapshot
        .is_loaded()
        .then(|| select(records.records(), &snapshot.filter, &policy));

    Html(render::directory_page(
        &snapshot.filter,
        selection.as_ref(),
        &policy,
    ))
}

async fn directory_redirect(RawQuery(query): RawQuery) -> Redirect {
    match query {
        Some(q) if !q.is_empty() => Redirect::permanent(&format!("/?{q}")),
        _ => Redirect::permanent("/"),
    }
}

async fn quote_form() -> Html<String> {
    Html(render::lead_form_page(
        &LeadFormMachine::new(LeadKind::Quote),
        &[],
        &SubmissionLedger::issue(),
    ))
}

async fn register_form() -> Html<String> {
    Html(render::lead_form_page(
        &LeadFormMachine::new(LeadKind::VendorRegister),
        &[],
        &SubmissionLedger::issue(),
    ))
}

async fn submit_quote(
    state: State<AppState>,
    meta: RequestMeta,
    fields: Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    submit_form(LeadKind::Quote, state, meta, fields).await
}

async fn submit_register(
    state: State<AppState>,
    meta: RequestMeta,
    fields: Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    submit_form(LeadKind::VendorRegister, state, meta, fields).await
}

async fn submit_form(
    kind: LeadKind,
    State(state): State<AppState>,
    RequestMeta(mut meta): RequestMeta,
    Form(mut fields): Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    if meta.page.is_empty() {
        meta.page = format!("{}{}", state.config.site_url, render::form_path(kind));
    }

    let token = fields
        .remove(TOKEN_FIELD)
        .as_deref()
        .and_then(SubmissionLedger::parse);
    let form = LeadForm::from_pairs(kind, fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    // Every response carries a fresh token for the next post.
    let next_token = SubmissionLedger::issue();

    if let Some(token) = token {
        let replay = match state.submissions.claim(token) {
            Claim::Fresh => None,
            Claim::InFlight => {
                let mut machine = LeadFormMachine::with_form(form.clone());
                if let Err(e) = machine.begin_submit(meta.clone()) {
                    tracing::debug!(error = %e, "duplicate post could not enter submitting view");
                }
                Some(machine)
            }
            Claim::Completed(machine) => Some(machine),
        };
        if let Some(machine) = replay {
            state.metrics.record_lead(kind, LeadOutcome::Duplicate);
            tracing::info!(kind = %kind, "duplicate form post; not relayed again");
            return (
                StatusCode::CONFLICT,
                Html(render::lead_form_page(&machine, &[], &next_token)),
            );
        }
    } else {
        tracing::debug!(kind = %kind, "form post without a submission token");
    }

    let scope = ViewScope::new(kind.as_str());
    let controller = LeadFormController::new(form);

    let (status, missing) = match controller.submit(&scope, state.webhook.clone(), meta) {
        Ok(delivery) => match delivery.await {
            Ok(Ok(_)) => {
                state.metrics.record_lead(kind, LeadOutcome::Sent);
                tracing::info!(kind = %kind, "lead relayed from form page");
                (StatusCode::OK, Vec::new())
            }
            Ok(Err(WebhookError::NotConfigured)) => {
                state.metrics.record_lead(kind, LeadOutcome::NotConfigured);
                tracing::warn!(kind = %kind, "lead dropped: webhook not configured");
                (StatusCode::SERVICE_UNAVAILABLE, Vec::new())
            }
            Ok(Err(e)) => {
                state.metrics.record_lead(kind, LeadOutcome::Failed);
                tracing::error!(kind = %kind, error = %e, "lead delivery failed");
                (StatusCode::BAD_GATEWAY, Vec::new())
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "delivery task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        },
        Err(FormError::MissingFields(missing)) => {
            state.metrics.record_lead(kind, LeadOutcome::MissingFields);
            (StatusCode::UNPROCESSABLE_ENTITY, missing)
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "form rejected submission");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    };

    let snapshot = controller.snapshot();
    if let Some(token) = token {
        if missing.is_empty() {
            state.submissions.complete(token, snapshot.clone());
        } else {
            // Nothing was sent; the same token may be posted again.
            state.submissions.release(token);
        }
    }

    (
        status,
        Html(render::lead_form_page(&snapshot, &missing, &next_token)),
    )
}

async fn terms() -> Html<String> {
    Html(render::terms_page())
}

async fn sitemap_page() -> Html<String> {
    Html(render::sitemap_page())
}

async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/xml; charset=utf-8")],
        render::sitemap_xml(&state.config.site_url),
    )
}
