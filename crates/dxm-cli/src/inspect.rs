//! # Inspect CLI — Companies document diagnostics.
//!
//! Loads a companies document through the same loader the server uses and
//! prints what a visitor would see versus what would be dropped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dxm_core::{CompanyCollection, LoadReport};

/// Inspect subcommand arguments.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Companies document to inspect.
    #[arg(default_value = "public/data/companies.json")]
    pub path: PathBuf,
}

/// Summary of one loaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inspection {
    pub records: usize,
    pub with_logo: usize,
    /// `(id, tag)` for every region tag outside the fixed enumeration.
    pub unknown_tags: Vec<(u64, String)>,
}

/// Execute the inspect subcommand.
///
/// Returns 1 when the document itself is unreadable; skipped elements and
/// duplicates are reported but do not fail the run.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let (collection, report) = CompanyCollection::from_json_slice(&bytes);

    if let Some(err) = &report.document_error {
        println!("FAIL {}: {err}", args.path.display());
        return Ok(1);
    }

    let inspection = inspect(&collection);
    print_summary(&args.path, &inspection, &report);
    Ok(0)
}

/// Summarize a loaded collection.
pub fn inspect(collection: &CompanyCollection) -> Inspection {
    let records = collection.records();
    Inspection {
        records: records.len(),
        with_logo: records.iter().filter(|r| r.logo.is_some()).count(),
        unknown_tags: records
            .iter()
            .flat_map(|r| r.region.unknown().iter().map(move |t| (r.id, t.clone())))
            .collect(),
    }
}

fn print_summary(path: &std::path::Path, inspection: &Inspection, report: &LoadReport) {
    let status = if report.is_clean() && inspection.unknown_tags.is_empty() {
        "OK"
    } else {
        "WARN"
    };
    println!("{status} {}", path.display());
    println!("  companies: {}", inspection.records);
    println!("  with logo: {}", inspection.with_logo);
    for (id, tag) in &inspection.unknown_tags {
        println!("  unknown region tag: id={id} tag={tag:?}");
    }
    for skipped in &report.skipped {
        println!("  skipped element #{}: {}", skipped.index, skipped.reason);
    }
    for id in &report.duplicate_ids {
        println!("  duplicate id dropped: {id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_counts_logos_and_unknown_tags() {
        let (collection, report) = CompanyCollection::from_json_slice(
            r#"[
                {"id": 1, "name": "A", "region": "서울", "logo": "/logos/1.png"},
                {"id": 2, "name": "B", "region": "서울,해외"},
                {"id": 3, "name": "C", "region": "부산", "logo": ""}
            ]"#
            .as_bytes(),
        );
        assert!(report.is_clean());
        let inspection = inspect(&collection);
        assert_eq!(inspection.records, 3);
        assert_eq!(inspection.with_logo, 1);
        assert_eq!(inspection.unknown_tags, vec![(2, "해외".to_string())]);
    }

    #[test]
    fn run_inspect_ok_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.json");
        std::fs::write(&path, r#"[{"id": 1, "name": "A", "region": "서울"}]"#).unwrap();
        assert_eq!(run_inspect(&InspectArgs { path }).unwrap(), 0);
    }

    #[test]
    fn run_inspect_broken_document_returns_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(run_inspect(&InspectArgs { path }).unwrap(), 1);
    }

    #[test]
    fn run_inspect_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = InspectArgs {
            path: dir.path().join("absent.json"),
        };
        assert!(run_inspect(&args).is_err());
    }
}
