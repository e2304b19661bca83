//! List the reconstructed timeline (`tl entries`).

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tl_core::{Entry, Period, SourceStore, load_timeline};

use super::summary::format_duration;

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    duration_seconds: f64,
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &impl SourceStore,
    period: Option<&Period>,
    json: bool,
) -> Result<()> {
    let timeline = load_timeline(store, period).context("failed to load timeline")?;

    if json {
        for entry in &timeline {
            let line = serde_json::to_string(&JsonEntry {
                entry,
                duration_seconds: entry.duration_secs(),
            })
            .context("failed to serialize entry")?;
            writeln!(writer, "{line}")?;
        }
        return Ok(());
    }

    if timeline.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }

    let last = timeline.len() - 1;
    for (i, entry) in timeline.iter().enumerate() {
        let timestamp = entry
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let duration = if i == last {
            "ongoing".to_string()
        } else {
            entry.duration.map(format_duration).unwrap_or_default()
        };
        match &entry.tags {
            Some(tags) => writeln!(writer, "{timestamp}  {duration:>8}  {} {tags}", entry.title)?,
            None => writeln!(writer, "{timestamp}  {duration:>8}  {}", entry.title)?,
        }
    }
    Ok(())
}
