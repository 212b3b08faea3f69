//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented JSON routes into a single OpenAPI 3.1
//! document served at `/openapi.json`. HTML pages are not part of it.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the JSON API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DXM API: Interior Directory",
        version = "0.3.2",
        description = "JSON API behind the DOXMEET hospital interior directory.\n\nProvides:\n- **Directory** queries with region filters, home-region exclusion, text search and pagination\n- **Lead forms** (quote request, vendor registration) and their relay to the configured webhook\n\nNo authentication. Health probes live under `/health/*`, Prometheus metrics at `/metrics`.",
        license(name = "MIT"),
        contact(name = "DOXMEET", url = "https://www.doxmeet.com")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // ── Directory ───────────────────────────────────────────────────
        crate::routes::directory::list_regions,
        crate::routes::directory::list_companies,
        // ── Leads ───────────────────────────────────────────────────────
        crate::routes::leads::get_form,
        crate::routes::leads::submit_lead,
    ),
    components(
        schemas(
            // ── Error types ─────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Directory DTOs ──────────────────────────────────────────
            crate::routes::directory::RegionsResponse,
            crate::routes::directory::LinkDto,
            crate::routes::directory::CompanyCard,
            crate::routes::directory::CompaniesResponse,
            // ── Lead DTOs ───────────────────────────────────────────────
            crate::routes::leads::FieldDto,
            crate::routes::leads::FormDefinition,
            crate::routes::leads::MetaDto,
            crate::routes::leads::LeadRequest,
            crate::routes::leads::LeadAccepted,
        ),
    ),
    tags(
        (name = "directory", description = "Company directory: regions, filtering, search and pagination"),
        (name = "leads", description = "Quote request and vendor registration forms relayed to the lead webhook"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates_successfully() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "DXM API: Interior Directory");
        assert_eq!(spec.info.version, "0.3.2");
    }

    #[test]
    fn test_openapi_spec_has_directory_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/regions"));
        assert!(spec.paths.paths.contains_key("/v1/companies"));
    }

    #[test]
    fn test_openapi_spec_has_lead_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/forms/{kind}"));
        assert!(spec.paths.paths.contains_key("/v1/leads/{kind}"));
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags: Vec<&str> = spec
            .tags
            .as_ref()
            .map(|t| t.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(tags, vec!["directory", "leads"]);
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components present");
        for name in ["ErrorBody", "CompaniesResponse", "CompanyCard", "LeadRequest", "LeadAccepted"] {
            assert!(
                components.schemas.contains_key(name),
                "missing schema {name}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_path_count() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.paths.paths.len(), 4);
    }

    #[test]
    fn test_openapi_spec_serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("\"openapi\""));
    }
}
