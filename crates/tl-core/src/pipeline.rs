//! Query pipeline: sources → parse → reconstruct → filter → group → render.
//!
//! Every query rebuilds the timeline from source text. Nothing is cached
//! between calls, so the same sources always give the same report.

use std::path::Path;

use crate::entry::Entry;
use crate::export::{Exporter, Report};
use crate::grouping::{Group, GroupSpec, group};
use crate::parser::parse_document;
use crate::period::{Period, filter};
use crate::store::{SourceStore, StoreError};
use crate::timeline::reconstruct;

/// What to report on.
#[derive(Debug, Default)]
pub struct Query {
    /// `None` reports on every entry.
    pub period: Option<Period>,
    /// Empty means a single implicit group.
    pub group_by: Vec<GroupSpec>,
}

impl Query {
    pub fn new(period: Option<Period>) -> Self {
        Self {
            period,
            group_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn grouped_by(mut self, spec: GroupSpec) -> Self {
        self.group_by.push(spec);
        self
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// The report was written with at least one row.
    Written { rows: usize, lines: usize },
    /// Nothing matched; a report without rows was written.
    Empty { lines: usize },
}

impl ExportStatus {
    const fn from_report(report: &Report) -> Self {
        if report.is_empty() {
            Self::Empty {
                lines: report.lines,
            }
        } else {
            Self::Written {
                rows: report.rows,
                lines: report.lines,
            }
        }
    }
}

/// Reads every source document and returns the merged, reconstructed
/// timeline restricted to `period`.
///
/// A document that cannot be read is skipped like a malformed entry.
pub fn load_timeline(
    store: &impl SourceStore,
    period: Option<&Period>,
) -> Result<Vec<Entry>, StoreError> {
    let documents = store.list_source_documents(period)?;

    let mut entries = Vec::new();
    for document in &documents {
        match store.read(document) {
            Ok(text) => {
                let parsed = parse_document(&text);
                tracing::debug!(
                    document = %document.display(),
                    entries = parsed.len(),
                    "parsed source document"
                );
                entries.extend(parsed);
            }
            Err(e) => {
                tracing::warn!(
                    document = %document.display(),
                    error = %e,
                    "skipping unreadable source document"
                );
            }
        }
    }

    let timeline = reconstruct(entries);
    Ok(filter(period, timeline))
}

/// Loads the timeline for `query` and partitions it into groups.
pub fn load_groups(store: &impl SourceStore, query: &Query) -> Result<Vec<Group>, StoreError> {
    let timeline = load_timeline(store, query.period.as_ref())?;
    Ok(group(&query.group_by, timeline))
}

/// Renders a report for `query` without persisting it.
pub fn render_report(
    store: &impl SourceStore,
    query: &Query,
    exporter: &impl Exporter,
) -> Result<Report, StoreError> {
    let groups = load_groups(store, query)?;
    Ok(exporter.export(&groups))
}

/// Renders a report for `query` and writes it to `destination`.
///
/// Zero matching entries is a success ([`ExportStatus::Empty`]); only a
/// failure to write the destination is an error.
pub fn export_report(
    store: &impl SourceStore,
    query: &Query,
    exporter: &impl Exporter,
    destination: &Path,
) -> Result<ExportStatus, StoreError> {
    let report = render_report(store, query, exporter)?;
    store.write(destination, &report.text)?;

    let status = ExportStatus::from_report(&report);
    tracing::info!(
        destination = %destination.display(),
        rows = report.rows,
        lines = report.lines,
        "wrote report"
    );
    Ok(status)
}
