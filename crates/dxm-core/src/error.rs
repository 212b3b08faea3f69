//! # Error Types
//!
//! All errors use `thiserror`. None of them is fatal to a page view: the
//! service maps each one to a narrower but still usable response.

use thiserror::Error;

use crate::lead::LeadKind;

/// Errors raised while parsing domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Label is not one of the known regions.
    #[error("unknown region: {0:?}")]
    UnknownRegion(String),

    /// Lead kind string is not `quote` or `vendor_register`.
    #[error("unknown lead kind: {0:?}")]
    UnknownLeadKind(String),

    /// Page size must be at least one record.
    #[error("page size must be at least 1, got {0}")]
    InvalidPageSize(usize),
}

/// Errors raised while filling a lead form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeadError {
    /// The field name is not part of this form.
    #[error("{kind} form has no field named {field:?}")]
    UnknownField {
        /// Form the field was set on.
        kind: LeadKind,
        /// Offending field name.
        field: String,
    },
}

/// Errors raised by the submission state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    /// One or more required fields are blank.
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// `complete` was called while nothing was being submitted.
    #[error("no submission is in progress")]
    NotSubmitting,
}
