//! # Company Records
//!
//! [`CompanyRecord`] is one vendor listing. [`CompanyCollection`] is the
//! read-only record store for a page view: built once from the companies
//! JSON document, sorted by `id`, shared behind an `Arc` and never mutated.
//!
//! Loading is lenient by contract. A document that is not JSON, or whose top
//! level is not an array, yields an empty collection; elements that do not
//! form a valid record are skipped. Every such decision is recorded in the
//! returned [`LoadReport`] so callers can log it.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::region::RegionTags;

/// One vendor listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Positive, unique, stable identifier. Primary sort key.
    pub id: u64,
    /// Display name. Never empty in a loaded collection.
    pub name: String,
    /// Service-area tags.
    pub region: RegionTags,
    /// Logo asset path. Absent means "render the initial placeholder".
    #[serde(default, deserialize_with = "blank_as_none", serialize_with = "none_as_blank")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", serialize_with = "none_as_blank")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", serialize_with = "none_as_blank")]
    pub website: Option<String>,
    /// Free text, searched in addition to the name.
    #[serde(default, deserialize_with = "blank_as_none", serialize_with = "none_as_blank")]
    pub description: Option<String>,
}

/// An outbound link on a company card.
///
/// A missing link is still rendered, as a disabled control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkAffordance {
    Enabled { href: String },
    Disabled,
}

impl LinkAffordance {
    fn from_option(href: Option<&str>) -> Self {
        match href {
            Some(h) => Self::Enabled { href: h.to_string() },
            None => Self::Disabled,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Enabled { href } => Some(href),
            Self::Disabled => None,
        }
    }
}

impl CompanyRecord {
    /// First character of the name, used when no logo exists.
    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn instagram_link(&self) -> LinkAffordance {
        LinkAffordance::from_option(self.instagram.as_deref())
    }

    pub fn website_link(&self) -> LinkAffordance {
        LinkAffordance::from_option(self.website.as_deref())
    }

    /// Reason this record cannot be part of a collection, if any.
    fn rejection(&self) -> Option<String> {
        if self.id == 0 {
            return Some("id must be a positive integer".to_string());
        }
        if self.name.trim().is_empty() {
            return Some("name must not be empty".to_string());
        }
        None
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn none_as_blank<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// An element of the source document that did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    /// Zero-based position in the source array.
    pub index: usize,
    pub reason: String,
}

/// Diagnostics produced while building a [`CompanyCollection`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Set when the whole document was unusable.
    pub document_error: Option<String>,
    pub skipped: Vec<SkippedElement>,
    /// Ids that appeared more than once; the first occurrence was kept.
    pub duplicate_ids: Vec<u64>,
}

impl LoadReport {
    /// True when every element became a record.
    pub fn is_clean(&self) -> bool {
        self.document_error.is_none() && self.skipped.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// Immutable, id-ordered record store. Cloning shares the records.
#[derive(Debug, Clone)]
pub struct CompanyCollection {
    records: Arc<[CompanyRecord]>,
}

impl Default for CompanyCollection {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }
}

impl CompanyCollection {
    /// The empty collection every load failure degrades to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-parsed records: sort by id and drop duplicate ids.
    pub fn from_records(records: Vec<CompanyRecord>) -> Self {
        Self::build(records, &mut LoadReport::default())
    }

    /// Parse a companies JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let document: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(v) => v,
            Err(e) => {
                report.document_error = Some(format!("malformed JSON: {e}"));
                return (Self::empty(), report);
            }
        };

        let serde_json::Value::Array(elements) = document else {
            report.document_error = Some("top-level value is not an array".to_string());
            return (Self::empty(), report);
        };

        let mut records = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<CompanyRecord>(element) {
                Ok(record) => match record.rejection() {
                    None => records.push(record),
                    Some(reason) => report.skipped.push(SkippedElement { index, reason }),
                },
                Err(e) => report.skipped.push(SkippedElement {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        let collection = Self::build(records, &mut report);
        (collection, report)
    }

    fn build(mut records: Vec<CompanyRecord>, report: &mut LoadReport) -> Self {
        // Stable sort keeps the first occurrence of a duplicated id first.
        records.sort_by_key(|r| r.id);
        let mut seen = HashSet::with_capacity(records.len());
        records.retain(|r| {
            if seen.insert(r.id) {
                true
            } else {
                report.duplicate_ids.push(r.id);
                false
            }
        });
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&CompanyRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Serialize back to the companies JSON document format.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.records)
    }
}
