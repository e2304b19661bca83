//! CSV and document reports (`tl csv`, `tl export`).

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tl_core::{ExportStatus, Exporter, Query, export_report, render_report};

use crate::store::FsStore;

/// Renders the report for `query`, to `output` when given or else to `writer`.
pub fn run<W: Write>(
    writer: &mut W,
    store: &FsStore,
    query: &Query,
    exporter: &impl Exporter,
    output: Option<&Path>,
) -> Result<()> {
    let Some(destination) = output else {
        let report = render_report(store, query, exporter).context("failed to build report")?;
        if report.is_empty() {
            eprintln!("No entries matched.");
        }
        if report.text.is_empty() || report.text.ends_with('\n') {
            write!(writer, "{}", report.text)?;
        } else {
            writeln!(writer, "{}", report.text)?;
        }
        return Ok(());
    };

    refuse_source_destination(store, destination)?;

    let status = export_report(store, query, exporter, destination)
        .with_context(|| format!("failed to export report to {}", destination.display()))?;
    match status {
        ExportStatus::Written { rows, lines } => {
            eprintln!(
                "Wrote {rows} entries ({lines} lines) to {}",
                destination.display()
            );
        }
        ExportStatus::Empty { lines } => {
            eprintln!(
                "No entries matched; wrote an empty report ({lines} lines) to {}",
                destination.display()
            );
        }
    }
    Ok(())
}

/// A report written where sources are read would be merged into every later
/// query, or overwrite a log outright.
fn refuse_source_destination(store: &FsStore, destination: &Path) -> Result<()> {
    if store.is_source_path(destination) {
        anyhow::bail!(
            "refusing to write report to {}: it would be read back as a source document",
            destination.display()
        );
    }
    Ok(())
}
