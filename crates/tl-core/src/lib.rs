//! Core domain logic for timelog.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: the append-only log records and their native text format
//! - Timeline reconstruction: merge, sort, and per-entry durations
//! - Reporting: period filtering, grouping, and CSV/document export
//!
//! All I/O goes through the [`SourceStore`] trait.

pub mod entry;
pub mod export;
pub mod grouping;
pub mod parser;
pub mod period;
pub mod pipeline;
pub mod store;
pub mod timeline;
pub mod types;
pub mod writer;

pub use entry::Entry;
pub use export::{CsvExporter, DocumentExporter, Exporter, Report};
pub use grouping::{Group, GroupSpec, GroupTotal, group, summarize};
pub use parser::parse_document;
pub use period::{Period, PeriodPreset, filter};
pub use pipeline::{ExportStatus, Query, export_report, load_groups, load_timeline, render_report};
pub use store::{MemoryStore, SourceStore, StoreError};
pub use timeline::reconstruct;
pub use types::{EntryId, HostId, ValidationError};
pub use writer::{AppendError, EntryDraft, append_entry, render_entry};
