//! # Custom Extractors & Validation
//!
//! - [`Validate`] and [`extract_validated_json`] for JSON request bodies.
//! - [`FilterQuery`] restores a directory [`FilterState`] from the query
//!   string shared by the HTML page and the JSON API.
//! - [`RequestMeta`] captures the submitting page and user agent from
//!   request headers.

use std::collections::BTreeSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::header::{HeaderName, REFERER, USER_AGENT};
use axum::http::request::Parts;
use axum::Json;
use dxm_core::{FilterState, Region, SubmissionMeta};

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Directory filter parsed from the query string.
///
/// | Key              | Meaning                                           |
/// |------------------|---------------------------------------------------|
/// | `region`         | selected region, repeatable                       |
/// | `regions`        | comma-separated selected regions                  |
/// | `exclude_region` | `true`/`1`/`on` drops the home region             |
/// | `q`              | search text                                       |
/// | `page`           | 1-based page, clamped later                       |
///
/// Unknown region names and the "전체" sentinel are ignored. Malformed
/// values fall back to defaults; this extractor never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery(pub FilterState);

impl FilterQuery {
    pub fn parse(query: Option<&str>) -> Self {
        let mut exclude = false;
        let mut regions = BTreeSet::new();
        let mut search = String::new();
        let mut page = 1u32;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "region" => regions.extend(value.parse::<Region>().ok()),
                "regions" => regions.extend(value.split(',').filter_map(|r| r.parse::<Region>().ok())),
                "exclude_region" => exclude = is_truthy(&value),
                "q" => search = value.into_owned(),
                "page" => page = value.trim().parse().unwrap_or(1),
                _ => {}
            }
        }

        Self(FilterState::from_parts(exclude, regions, search, page))
    }

    pub fn into_inner(self) -> FilterState {
        self.0
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for FilterQuery {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query()))
    }
}

/// Submission metadata from `Referer` and `User-Agent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta(pub SubmissionMeta);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self(SubmissionMeta {
            page: header(REFERER),
            user_agent: header(USER_AGENT),
        }))
    }
}
