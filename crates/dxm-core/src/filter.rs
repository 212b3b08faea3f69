//! # Filter / Search / Pagination Engine
//!
//! A pure function of `(records, FilterState)`. Predicates are conjunctive
//! and applied per record in this order:
//!
//! 1. **Region exclusion**: with `exclude_region` set, records tagged with the
//!    designated excluded region are dropped, even when they also carry
//!    other tags.
//! 2. **Region inclusion**: with a non-empty selection, a record is kept only
//!    when its tags intersect the selection (OR across selected regions).
//! 3. **Text search**: with a non-blank query, the lowercased query must be a
//!    substring of the lowercased name or description.
//!
//! The filtered sequence preserves source order, which is `id` ascending for
//! a [`CompanyCollection`](crate::CompanyCollection). Zero matches is a normal
//! result, reported through [`DirectorySelection::is_empty`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::company::CompanyRecord;
use crate::error::CoreError;
use crate::region::Region;

/// Default number of cards per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of records per page. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(size: usize) -> Result<Self, CoreError> {
        if size == 0 {
            return Err(CoreError::InvalidPageSize(size));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

/// Site-wide engine parameters that are not user-controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryPolicy {
    /// Region dropped when `exclude_region` is set (the home region).
    pub excluded_region: Region,
    pub page_size: PageSize,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            excluded_region: Region::Seoul,
            page_size: PageSize::default(),
        }
    }
}

/// User-controlled directory state, owned by one view.
///
/// Every predicate setter resets `current_page` to 1 so a narrowed result
/// never lands on a stale, out-of-range page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    exclude_region: bool,
    selected_regions: BTreeSet<Region>,
    search_query: String,
    current_page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            exclude_region: false,
            selected_regions: BTreeSet::new(),
            search_query: String::new(),
            current_page: 1,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a state from serialized parts (e.g. a query string). The page
    /// is taken as-is and clamped later by [`select`].
    pub fn from_parts(
        exclude_region: bool,
        selected_regions: BTreeSet<Region>,
        search_query: impl Into<String>,
        current_page: u32,
    ) -> Self {
        Self {
            exclude_region,
            selected_regions,
            search_query: search_query.into(),
            current_page: current_page.max(1),
        }
    }

    pub fn exclude_region(&self) -> bool {
        self.exclude_region
    }

    pub fn selected_regions(&self) -> &BTreeSet<Region> {
        &self.selected_regions
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Trimmed query, or `None` when the query is blank.
    pub fn effective_query(&self) -> Option<&str> {
        let q = self.search_query.trim();
        (!q.is_empty()).then_some(q)
    }

    pub fn set_exclude_region(&mut self, exclude: bool) {
        self.exclude_region = exclude;
        self.current_page = 1;
    }

    pub fn set_selected_regions(&mut self, regions: BTreeSet<Region>) {
        self.selected_regions = regions;
        self.current_page = 1;
    }

    pub fn toggle_region(&mut self, region: Region) {
        if !self.selected_regions.remove(&region) {
            self.selected_regions.insert(region);
        }
        self.current_page = 1;
    }

    pub fn clear_regions(&mut self) {
        self.selected_regions.clear();
        self.current_page = 1;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
    }

    /// Move to `page`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: u32, total_pages: u32) {
        self.current_page = page.clamp(1, total_pages.max(1));
    }

    pub fn next_page(&mut self, total_pages: u32) {
        self.go_to_page(self.current_page.saturating_add(1), total_pages);
    }

    pub fn previous_page(&mut self, total_pages: u32) {
        self.go_to_page(self.current_page.saturating_sub(1), total_pages);
    }

    /// Whether `record` passes every active predicate.
    pub fn matches(&self, record: &CompanyRecord, excluded_region: Region) -> bool {
        if self.exclude_region && record.region.contains(excluded_region) {
            return false;
        }

        if !self.selected_regions.is_empty() && !record.region.intersects(&self.selected_regions) {
            return false;
        }

        if let Some(query) = self.effective_query() {
            let query = query.to_lowercase();
            let name_ok = record.name.to_lowercase().contains(&query);
            let description_ok = record
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query));
            if !name_ok && !description_ok {
                return false;
            }
        }

        true
    }
}

/// Records passing `state`, in source order. The source is not touched.
pub fn filter_records<'a>(
    records: &'a [CompanyRecord],
    state: &FilterState,
    excluded_region: Region,
) -> Vec<&'a CompanyRecord> {
    records
        .iter()
        .filter(|r| state.matches(r, excluded_region))
        .collect()
}

/// Page metadata for a filtered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Clamped 1-based page.
    pub page: u32,
    /// `max(1, ceil(filtered_count / page_size))`.
    pub total_pages: u32,
    /// Slice bounds into the filtered sequence.
    pub start: usize,
    pub end: usize,
}

impl Pagination {
    pub fn compute(filtered_count: usize, requested_page: u32, page_size: PageSize) -> Self {
        let size = page_size.get();
        let total_pages = u32::try_from(filtered_count.div_ceil(size))
            .unwrap_or(u32::MAX)
            .max(1);
        let page = requested_page.clamp(1, total_pages);
        let start = ((page - 1) as usize).saturating_mul(size).min(filtered_count);
        let end = start.saturating_add(size).min(filtered_count);
        Self {
            page,
            total_pages,
            start,
            end,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// The visible page of a directory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySelection<'a> {
    /// Records on the current page.
    pub items: Vec<&'a CompanyRecord>,
    pub filtered_count: usize,
    pub total_count: usize,
    pub pagination: Pagination,
}

impl DirectorySelection<'_> {
    /// Zero matches: render the "no results" affordance.
    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }
}

/// Filter, then slice out the current page.
pub fn select<'a>(
    records: &'a [CompanyRecord],
    state: &FilterState,
    policy: &DirectoryPolicy,
) -> DirectorySelection<'a> {
    let filtered = filter_records(records, state, policy.excluded_region);
    let pagination = Pagination::compute(filtered.len(), state.current_page(), policy.page_size);
    DirectorySelection {
        items: filtered[pagination.start..pagination.end].to_vec(),
        filtered_count: filtered.len(),
        total_count: records.len(),
        pagination,
    }
}
