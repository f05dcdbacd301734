//! I/O module
//!
//! Handles snapshot parsing and report output.
//!
//! # Components
//!
//! - `json_format` - Wire format for rule drafts and snapshots
//! - `snapshot_reader` - Synchronous snapshot file reader
//! - `async_reader` - Asynchronous snapshot file reader
//! - `report` - CSV audit report

pub mod async_reader;
pub mod json_format;
pub mod report;
pub mod snapshot_reader;

pub use async_reader::read_snapshot_async;
pub use json_format::{parse_rule_draft, parse_snapshot, RuleDraft, Snapshot, TierDraft};
pub use report::{report_rows, write_report_csv, ReportKind, ReportRow};
pub use snapshot_reader::read_snapshot;
