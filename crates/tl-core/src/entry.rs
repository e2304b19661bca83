//! The logged entry, the atomic unit of the timeline.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::types::{EntryId, ValidationError, format_duration_secs, format_timestamp};

/// Title used when a heading carries none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Property names the log system itself maintains.
pub mod keys {
    pub const ID: &str = "ID";
    pub const TIMESTAMP: &str = "TIMESTAMP";
    pub const TITLE: &str = "TITLE";
    pub const TAGS: &str = "TAGS";
    pub const DURATION: &str = "DURATION";
}

/// One logged event.
///
/// `properties` holds every namespaced property by its upper-cased name
/// without the prefix, including the serialized forms of `id`, `timestamp`
/// and, once reconstructed, `duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,

    /// Sole ordering key. `None` when missing or unparseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,

    pub title: String,

    /// Heading tags in `:a:b:` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    pub properties: BTreeMap<String, String>,

    /// Drawer lines without the namespace prefix, kept verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_properties: Vec<(String, String)>,

    /// Time until the next entry; set only by timeline reconstruction.
    #[serde(skip)]
    pub duration: Option<TimeDelta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: None,
            timestamp: None,
            title: DEFAULT_TITLE.to_string(),
            tags: None,
            properties: BTreeMap::new(),
            foreign_properties: Vec::new(),
            duration: None,
            body: None,
        }
    }
}

impl Entry {
    /// Looks up a report field by name, case-insensitively.
    ///
    /// Properties win; the core fields back them up for entries whose
    /// property block omits them.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let key = name.trim().to_ascii_uppercase();
        if let Some(value) = self.properties.get(&key) {
            return Some(Cow::Borrowed(value.as_str()));
        }
        match key.as_str() {
            keys::ID => self.id.as_ref().map(|id| Cow::Borrowed(id.as_str())),
            keys::TIMESTAMP => self.timestamp.map(|ts| Cow::Owned(format_timestamp(ts))),
            keys::TITLE => Some(Cow::Borrowed(self.title.as_str())),
            keys::TAGS => self.tags.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    /// Individual tags from the heading.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split(':').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Records the reconstructed duration, mirroring it into `DURATION`.
    ///
    /// The last entry of a timeline is still ongoing and is stored as `0`.
    pub fn set_duration(&mut self, delta: TimeDelta, ongoing: bool) {
        let rendered = if ongoing {
            "0".to_string()
        } else {
            format_duration_secs(delta)
        };
        self.duration = Some(delta);
        self.properties.insert(keys::DURATION.to_string(), rendered);
    }

    /// Duration in seconds, zero when not reconstructed.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.duration
            .and_then(|d| d.num_microseconds())
            .map_or(0.0, |us| us as f64 / 1_000_000.0)
    }
}

/// Normalizes a property key to its stored form.
pub fn normalize_key(key: &str) -> Result<String, ValidationError> {
    let key = key.trim();
    if key.is_empty() || key.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(ValidationError::InvalidPropertyKey {
            key: key.to_string(),
        });
    }
    Ok(key.to_ascii_uppercase())
}

/// Converts free-text tags (`work meeting`, `work:meeting`, `:work:`) to
/// heading form. Returns `None` when no tag remains.
pub fn normalize_tags(raw: &str) -> Option<String> {
    let tags: Vec<&str> = raw
        .split(|c: char| c == ':' || c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(format!(":{}:", tags.join(":")))
    }
}
