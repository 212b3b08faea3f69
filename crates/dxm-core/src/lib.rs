//! # dxm-core — Domain Types for the Interior Directory
//!
//! Leaf crate of the workspace. Everything the directory website decides
//! lives here as plain data and pure functions; the service and CLI crates
//! only move bytes in and out.
//!
//! ## Modules
//!
//! - [`region`] — the fixed region enumeration and the canonical
//!   [`RegionTags`] set every record carries.
//! - [`company`] — [`CompanyRecord`] and the immutable [`CompanyCollection`]
//!   loaded from the companies JSON document.
//! - [`filter`] — [`FilterState`] and the filter/search/pagination engine.
//! - [`lead`] — quote and vendor registration form definitions and the
//!   webhook [`Envelope`].
//! - [`form`] — the per-form submission state machine.
//! - [`sitemap`] — static route entries for `sitemap.xml`.
//!
//! ## Crate Policy
//!
//! - No I/O and no async. Loading, HTTP and rendering belong to callers.
//! - No `.unwrap()` outside tests.
//! - Filtering never mutates the source collection.

pub mod company;
pub mod error;
pub mod filter;
pub mod form;
pub mod lead;
pub mod region;
pub mod sitemap;

pub use company::{CompanyCollection, CompanyRecord, LinkAffordance, LoadReport, SkippedElement};
pub use error::{CoreError, FormError, LeadError};
pub use filter::{
    filter_records, select, DirectoryPolicy, DirectorySelection, FilterState, PageSize, Pagination,
};
pub use form::{FormOutcome, FormStatus, LeadFormMachine};
pub use lead::{Confirmation, Envelope, FieldSpec, LeadForm, LeadKind, LeadPayload, SubmissionMeta};
pub use region::{Region, RegionTags, REGION_COUNT};
pub use sitemap::{ChangeFrequency, SitemapEntry};
