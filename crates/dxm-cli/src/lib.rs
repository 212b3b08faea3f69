//! # dxm-cli — Data Tooling for the Interior Directory
//!
//! Provides the `dxm` command-line interface used to maintain the
//! companies document the directory serves.
//!
//! ## Subcommands
//!
//! - `dxm convert` — Spreadsheet (or JSON rows) to `companies.json`.
//! - `dxm inspect` — Load a companies document the way the server does and
//!   report what it would drop.
//!
//! ```bash
//! dxm convert --input data/companies.xlsx --output public/data/companies.json
//! dxm inspect public/data/companies.json
//! ```

pub mod convert;
pub mod inspect;
