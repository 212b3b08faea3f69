//! # Lead Form State Machine
//!
//! ```text
//! Idle ──begin_submit──▶ Submitting ──complete(Sent)──────────▶ Confirmed
//!   ▲                        │
//!   │                        └──complete(NotConfigured | TransportFailed)──▶ Failed
//!   └──────── dismiss / edit ◀───────────────────────────────────────────────┘
//! ```
//!
//! `Submitting` blocks a second send. A confirmed submission clears the form;
//! a failed one keeps every value so the user can resubmit without retyping.
//! There is no retry queue.

use serde::Serialize;

use crate::error::{FormError, LeadError};
use crate::lead::{Envelope, LeadForm, LeadKind, SubmissionMeta};

/// Current state of one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Submitting,
    Confirmed,
    /// Idle-with-error.
    Failed {
        message: String,
        /// Whether resubmitting can succeed without operator action.
        retryable: bool,
    },
}

/// Result of one delivery attempt, as seen by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The request was dispatched.
    Sent,
    /// No webhook endpoint is configured; nothing was sent.
    NotConfigured { diagnostic: String },
    /// The request could not be dispatched.
    TransportFailed,
}

/// A lead form plus its submission status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFormMachine {
    form: LeadForm,
    status: FormStatus,
}

impl LeadFormMachine {
    pub fn new(kind: LeadKind) -> Self {
        Self::with_form(LeadForm::new(kind))
    }

    pub fn with_form(form: LeadForm) -> Self {
        Self {
            form,
            status: FormStatus::Idle,
        }
    }

    pub fn form(&self) -> &LeadForm {
        &self.form
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// Submit control is enabled only for a complete form that is not
    /// already being sent.
    pub fn can_submit(&self) -> bool {
        self.status != FormStatus::Submitting && self.form.is_complete()
    }

    /// Edit one field. Editing after a confirmation or failure returns the
    /// form to `Idle`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), LeadError> {
        self.form.set(name, value)?;
        if matches!(self.status, FormStatus::Confirmed | FormStatus::Failed { .. }) {
            self.status = FormStatus::Idle;
        }
        Ok(())
    }

    /// Enter `Submitting` and build the envelope to deliver.
    pub fn begin_submit(&mut self, meta: SubmissionMeta) -> Result<Envelope, FormError> {
        if self.status == FormStatus::Submitting {
            return Err(FormError::AlreadySubmitting);
        }
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        self.status = FormStatus::Submitting;
        Ok(Envelope::new(&self.form, meta))
    }

    /// Apply the delivery outcome of the in-flight submission.
    pub fn complete(&mut self, outcome: FormOutcome) -> Result<(), FormError> {
        if self.status != FormStatus::Submitting {
            return Err(FormError::NotSubmitting);
        }
        self.status = match outcome {
            FormOutcome::Sent => {
                self.form.clear();
                FormStatus::Confirmed
            }
            FormOutcome::NotConfigured { diagnostic } => FormStatus::Failed {
                message: diagnostic,
                retryable: false,
            },
            FormOutcome::TransportFailed => FormStatus::Failed {
                message: self.form.kind().retry_message().to_string(),
                retryable: true,
            },
        };
        Ok(())
    }

    /// Close the confirmation dialog or error message.
    pub fn dismiss(&mut self) {
        if self.status != FormStatus::Submitting {
            self.status = FormStatus::Idle;
        }
    }
}
