//! # Convert CLI — Spreadsheet to companies JSON.
//!
//! Reads the vendor spreadsheet maintained by the operations team and
//! writes the companies document the directory serves.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: data/companies.xlsx -> public/data/companies.json
//! dxm convert
//!
//! # A JSON array of row objects works too (same column names):
//! dxm convert --input export/rows.json --output /tmp/companies.json
//! ```
//!
//! ## Column Mapping
//!
//! Header names are matched case-insensitively.
//!
//! | Field         | Columns (first non-blank wins)          |
//! |---------------|-----------------------------------------|
//! | `id`          | `no`, `id`                              |
//! | `name`        | `name`                                  |
//! | `region`      | `region`                                |
//! | `instagram`   | `insta_hp`, `insta`, `instagram`        |
//! | `website`     | `official_hp`, `website`, `homepage`    |
//! | `description` | `description`                           |
//!
//! Rows without a positive id, a name or a region are skipped with a
//! warning. Links that are not `http://` or `https://` URLs (including the
//! spreadsheet's "X" marker) are dropped. The logo is whichever of
//! `{public}/logos/{id}.png|.jpg|.jpeg|.webp` exists first.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use clap::Args;
use dxm_core::{CompanyCollection, CompanyRecord, RegionTags};
use serde_json::{Map, Value};

/// One spreadsheet row keyed by lowercase header.
pub type Row = Map<String, Value>;

/// Logo extensions in probe order.
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Convert subcommand arguments.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Spreadsheet (xlsx, xls, ods) or JSON array of row objects.
    #[arg(long, default_value = "data/companies.xlsx")]
    pub input: PathBuf,

    /// Companies document to write.
    #[arg(long, default_value = "public/data/companies.json")]
    pub output: PathBuf,

    /// Public asset root; logos are probed under `{public_dir}/logos`.
    #[arg(long, default_value = "public")]
    pub public_dir: PathBuf,
}

/// A row that did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub reason: String,
}

/// Result of converting a set of rows.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub records: Vec<CompanyRecord>,
    pub skipped: Vec<SkippedRow>,
    /// Ids seen more than once; the first row wins.
    pub duplicate_ids: Vec<u64>,
}

impl Conversion {
    pub fn logo_count(&self) -> usize {
        self.records.iter().filter(|r| r.logo.is_some()).count()
    }
}

/// Execute the convert subcommand.
pub fn run_convert(args: &ConvertArgs) -> Result<u8> {
    tracing::info!(input = %args.input.display(), output = %args.output.display(), "converting");

    if !args.input.is_file() {
        bail!(
            "input file not found: {} (place the spreadsheet at data/companies.xlsx or pass --input)",
            args.input.display()
        );
    }

    let rows = read_rows(&args.input)?;
    tracing::info!(rows = rows.len(), "read input rows");

    let conversion = convert_rows(rows, &args.public_dir);
    for skipped in &conversion.skipped {
        tracing::warn!(row = skipped.row, reason = %skipped.reason, "row skipped");
    }
    for id in &conversion.duplicate_ids {
        tracing::warn!(id, "duplicate id; keeping the first row");
    }

    let logo_count = conversion.logo_count();
    let collection = CompanyCollection::from_records(conversion.records);
    let json = collection
        .to_json_pretty()
        .context("failed to serialize companies")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Wrote {}", args.output.display());
    println!("  companies: {}", collection.len());
    println!("  with logo: {logo_count}");
    if !conversion.skipped.is_empty() {
        println!("  skipped rows: {}", conversion.skipped.len());
    }
    Ok(0)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Read rows from a spreadsheet's first worksheet, or from a JSON array of
/// objects when the file ends in `.json`.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        read_json_rows(path)
    } else {
        read_sheet_rows(path)
    }
}

fn read_json_rows(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Array(items) = value else {
        bail!("{} must contain a JSON array of row objects", path.display());
    };
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => normalize_keys(map),
            _ => Row::new(),
        })
        .collect())
}

fn read_sheet_rows(path: &Path) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open spreadsheet {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("{} has no worksheets", path.display()))?
        .with_context(|| format!("failed to read first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header
        .iter()
        .map(|cell| cell.to_string().trim().to_lowercase())
        .collect();

    Ok(rows
        .map(|cells| {
            header
                .iter()
                .zip(cells)
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, cell)| (key.clone(), cell_value(cell)))
                .collect()
        })
        .collect())
}

/// Spreadsheet cell as JSON. Blank cells become empty strings.
pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => Value::from(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

/// Lowercase and trim every key.
pub fn normalize_keys(row: Row) -> Row {
    row.into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Map rows to records, sorted by id.
pub fn convert_rows(rows: Vec<Row>, public_dir: &Path) -> Conversion {
    let mut conversion = Conversion::default();
    let mut seen = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let record = match row_to_record(row, public_dir) {
            Ok(record) => record,
            Err(reason) => {
                conversion.skipped.push(SkippedRow {
                    row: row_number,
                    reason,
                });
                continue;
            }
        };
        if !seen.insert(record.id) {
            conversion.duplicate_ids.push(record.id);
            continue;
        }
        conversion.records.push(record);
    }

    conversion.records.sort_by_key(|r| r.id);
    conversion
}

fn row_to_record(row: &Row, public_dir: &Path) -> Result<CompanyRecord, String> {
    let id = first_present(row, &["no", "id"])
        .and_then(parse_id)
        .unwrap_or(0);
    let name = text(row.get("name"));
    let region = text(row.get("region"));

    let mut missing = Vec::new();
    if id == 0 {
        missing.push("id");
    }
    if name.is_empty() {
        missing.push("name");
    }
    if region.is_empty() {
        missing.push("region");
    }
    if !missing.is_empty() {
        return Err(format!("missing required value: {}", missing.join(", ")));
    }

    let description = text(row.get("description"));
    Ok(CompanyRecord {
        id,
        name,
        region: RegionTags::parse(&region),
        logo: pick_logo(public_dir, id),
        instagram: first_present(row, &["insta_hp", "insta", "instagram"]).and_then(clean_url),
        website: first_present(row, &["official_hp", "website", "homepage"]).and_then(clean_url),
        description: (!description.is_empty()).then_some(description),
    })
}

/// First column among `keys` whose value is not blank.
fn first_present<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !text(Some(*v)).is_empty())
}

/// Cell text, trimmed. Numbers print without a trailing `.0`.
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Positive integer id from a number or numeric string.
pub fn parse_id(value: &Value) -> Option<u64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (f.is_finite() && f >= 1.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

/// Keep only absolute http(s) URLs. Blank and "X" mean no link.
pub fn clean_url(value: &Value) -> Option<String> {
    let s = text(Some(value));
    if s.is_empty() || s.eq_ignore_ascii_case("x") {
        return None;
    }
    (s.starts_with("http://") || s.starts_with("https://")).then_some(s)
}

/// `/logos/{id}.{ext}` for the first extension that exists on disk.
pub fn pick_logo(public_dir: &Path, id: u64) -> Option<String> {
    LOGO_EXTENSIONS.iter().find_map(|ext| {
        let file = format!("{id}.{ext}");
        public_dir
            .join("logos")
            .join(&file)
            .is_file()
            .then(|| format!("/logos/{file}"))
    })
}
