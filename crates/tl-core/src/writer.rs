//! Creation and canonical rendering of entries.
//!
//! This is the only write path of the log. It never reads or reconciles
//! existing entries; a correction is simply a newer entry.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::entry::{DEFAULT_TITLE, Entry, keys, normalize_key, normalize_tags};
use crate::parser::{PROPERTIES_END, PROPERTIES_START, is_escaped_heading};
use crate::store::{SourceStore, StoreError};
use crate::types::{EntryId, HostId, NAMESPACE, ValidationError, format_timestamp};

/// Field set for a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub body: Option<String>,
    /// Additional properties; keys are normalized on creation.
    pub properties: BTreeMap<String, String>,
}

/// Errors from appending a new entry.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Entry {
    /// Builds a new entry stamped with an id and timestamp for `now`.
    ///
    /// Extra properties may not override the system-maintained ones.
    pub fn create(
        draft: EntryDraft,
        host: &HostId,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let id = EntryId::generate(host, now);
        let title = draft
            .title
            .map(|t| single_line(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let tags = draft.tags.as_deref().and_then(normalize_tags);

        let mut properties = BTreeMap::new();
        for (key, value) in draft.properties {
            let key = normalize_key(&key)?;
            if matches!(
                key.as_str(),
                keys::ID | keys::TIMESTAMP | keys::TITLE | keys::TAGS | keys::DURATION
            ) {
                return Err(ValidationError::InvalidPropertyKey { key });
            }
            properties.insert(key, single_line(&value));
        }
        properties.insert(keys::ID.to_string(), id.to_string());
        properties.insert(keys::TIMESTAMP.to_string(), format_timestamp(now));
        properties.insert(keys::TITLE.to_string(), title.clone());
        if let Some(tags) = &tags {
            properties.insert(keys::TAGS.to_string(), tags.clone());
        }

        Ok(Self {
            id: Some(id),
            timestamp: Some(now),
            title,
            tags,
            properties,
            foreign_properties: Vec::new(),
            duration: None,
            body: draft
                .body
                .map(|b| b.trim_end().to_string())
                .filter(|b| !b.is_empty()),
        })
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders one entry block in the native document format.
///
/// The block ends with a newline. Body lines that would read as a heading
/// are escaped with a leading comma.
pub fn render_entry(entry: &Entry) -> String {
    let mut out = String::new();

    if let Some(tags) = &entry.tags {
        writeln!(out, "* {} {tags}", entry.title).unwrap();
    } else {
        writeln!(out, "* {}", entry.title).unwrap();
    }

    out.push_str(PROPERTIES_START);
    out.push('\n');
    let leading = [keys::ID, keys::TIMESTAMP, keys::TITLE, keys::TAGS];
    for key in leading {
        if let Some(value) = entry.field(key) {
            push_property(&mut out, &format!("{NAMESPACE}-{key}"), &value);
        }
    }
    for (key, value) in &entry.properties {
        if !leading.contains(&key.as_str()) {
            push_property(&mut out, &format!("{NAMESPACE}-{key}"), value);
        }
    }
    for (key, value) in &entry.foreign_properties {
        push_property(&mut out, key, value);
    }
    out.push_str(PROPERTIES_END);
    out.push('\n');

    if let Some(body) = &entry.body {
        for line in body.lines() {
            if is_escaped_heading(line) {
                out.push(',');
            }
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn push_property(out: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        writeln!(out, ":{key}:").unwrap();
    } else {
        writeln!(out, ":{key}: {value}").unwrap();
    }
}

/// Creates an entry from `draft` and appends it to `destination`.
///
/// The store creates the document and its parent directories when missing.
pub fn append_entry(
    store: &impl SourceStore,
    destination: &Path,
    draft: EntryDraft,
    host: &HostId,
    now: NaiveDateTime,
) -> Result<Entry, AppendError> {
    let entry = Entry::create(draft, host, now)?;
    let mut text = render_entry(&entry);
    text.push('\n');
    store.append(destination, &text)?;
    tracing::info!(
        id = %entry.id.as_ref().map_or("", EntryId::as_str),
        destination = %destination.display(),
        "appended entry"
    );
    Ok(entry)
}
