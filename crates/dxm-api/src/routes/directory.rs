//! # Directory API
//!
//! Routes:
//! - GET /v1/regions: canonical region list and the excluded home region
//! - GET /v1/companies: filtered, paginated company cards
//!
//! `/v1/companies` takes the same query string as the HTML directory page,
//! so any directory URL can be replayed against the JSON API.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use dxm_core::{select, CompanyRecord, LinkAffordance, Region};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::extractors::FilterQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/regions", get(list_regions))
        .route("/v1/companies", get(list_companies))
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Region list in display order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
    /// Region dropped by `exclude_region=true`.
    pub excluded_region: String,
}

/// An outbound link; `href` is absent when the link is disabled.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkDto {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl From<LinkAffordance> for LinkDto {
    fn from(link: LinkAffordance) -> Self {
        Self {
            enabled: link.href().is_some(),
            href: link.href().map(str::to_string),
        }
    }
}

/// One company card.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyCard {
    pub id: u64,
    pub name: String,
    /// Region labels, canonical order first, unknown labels last.
    pub regions: Vec<String>,
    /// Logo path, or null when the card shows `initial`.
    pub logo: Option<String>,
    pub initial: String,
    pub instagram: LinkDto,
    pub website: LinkDto,
    pub description: Option<String>,
}

impl From<&CompanyRecord> for CompanyCard {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            regions: record.region.labels().into_iter().map(str::to_string).collect(),
            logo: record.logo.clone(),
            initial: record.initial(),
            instagram: record.instagram_link().into(),
            website: record.website_link().into(),
            description: record.description.clone(),
        }
    }
}

/// One page of the filtered directory.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompaniesResponse {
    pub items: Vec<CompanyCard>,
    pub filtered_count: usize,
    pub total_count: usize,
    /// Clamped 1-based page.
    pub page: u32,
    pub total_pages: u32,
    pub page_size: usize,
    /// No record matched the filters.
    pub empty: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /v1/regions — List regions.
#[utoipa::path(
    get,
    path = "/v1/regions",
    responses(
        (status = 200, description = "Regions in display order", body = RegionsResponse),
    ),
    tag = "directory"
)]
async fn list_regions(State(state): State<AppState>) -> Json<RegionsResponse> {
    Json(RegionsResponse {
        regions: Region::all().iter().map(|r| r.as_str().to_string()).collect(),
        excluded_region: state.config.home_region.as_str().to_string(),
    })
}

/// GET /v1/companies — Filter, search and paginate the directory.
///
/// A record source failure yields an empty page, never an error.
#[utoipa::path(
    get,
    path = "/v1/companies",
    params(
        ("region" = Option<Vec<String>>, Query, description = "Selected region, repeatable"),
        ("regions" = Option<String>, Query, description = "Comma-separated selected regions"),
        ("exclude_region" = Option<bool>, Query, description = "Drop the home region"),
        ("q" = Option<String>, Query, description = "Case-insensitive name/description search"),
        ("page" = Option<u32>, Query, description = "1-based page, clamped to range"),
    ),
    responses(
        (status = 200, description = "One page of company cards", body = CompaniesResponse),
    ),
    tag = "directory"
)]
async fn list_companies(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery,
) -> Json<CompaniesResponse> {
    let records = state.records().await;
    let policy = state.policy();
    let selection = select(records.records(), &filter, &policy);

    tracing::debug!(
        filtered = selection.filtered_count,
        total = selection.total_count,
        page = selection.pagination.page,
        "directory query"
    );

    Json(CompaniesResponse {
        items: selection.items.iter().copied().map(CompanyCard::from).collect(),
        filtered_count: selection.filtered_count,
        total_count: selection.total_count,
        page: selection.pagination.page,
        total_pages: selection.pagination.total_pages,
        page_size: policy.page_size.get(),
        empty: selection.is_empty(),
    })
}
