//! Append a new entry (`tl log`).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tl_core::{EntryDraft, HostId, SourceStore, append_entry};

/// Splits a `KEY=VALUE` argument.
pub fn parse_property(arg: &str) -> Result<(String, String)> {
    let Some((key, value)) = arg.split_once('=') else {
        anyhow::bail!("Invalid property: {arg}. Use KEY=VALUE");
    };
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Builds a draft from command-line values.
pub fn draft(
    title: &str,
    tags: Option<&str>,
    body: Option<&str>,
    properties: &[String],
) -> Result<EntryDraft> {
    let properties = properties
        .iter()
        .map(|p| parse_property(p))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(EntryDraft {
        title: Some(title.to_string()),
        tags: tags.map(String::from),
        body: body.map(String::from),
        properties,
    })
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &impl SourceStore,
    destination: &Path,
    draft: EntryDraft,
    host: &HostId,
    now: NaiveDateTime,
) -> Result<()> {
    let entry = append_entry(store, destination, draft, host, now)
        .with_context(|| format!("failed to append entry to {}", destination.display()))?;

    let id = entry.id.as_ref().map_or("", |id| id.as_str());
    writeln!(writer, "Logged {id}: {}", entry.title)?;
    Ok(())
}
