//! Status command for showing where entries live and the latest activity.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tl_core::timeline::span;
use tl_core::{SourceStore, load_timeline};

use super::summary::format_duration;
use crate::store::FsStore;

pub fn run<W: Write>(writer: &mut W, store: &FsStore, active_document: &Path) -> Result<()> {
    let documents = store
        .list_source_documents(None)
        .context("failed to list source documents")?;

    writeln!(writer, "Timelog status")?;
    writeln!(writer, "Log directory: {}", store.root().display())?;
    writeln!(writer, "Active document: {}", active_document.display())?;

    if documents.is_empty() {
        writeln!(writer, "No log documents found.")?;
        return Ok(());
    }

    writeln!(writer, "Documents:")?;
    for document in &documents {
        let name = document
            .strip_prefix(store.root())
            .unwrap_or(document)
            .display();
        writeln!(writer, "- {name}")?;
    }

    let timeline = load_timeline(store, None).context("failed to load timeline")?;
    writeln!(writer, "Entries: {}", timeline.len())?;
    writeln!(writer, "Span: {}", format_duration(span(&timeline)))?;
    if let Some(last) = timeline.last() {
        let since = last
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(writer, "Current: {} (since {since})", last.title)?;
    }

    Ok(())
}
