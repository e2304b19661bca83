//! Grouping and per-group aggregation.
//!
//! Grouping is a seam: callers describe group keys with [`GroupSpec`] values,
//! either a plain field name or any function from an entry to a key. An empty
//! spec list yields a single implicit group holding every entry.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use chrono::TimeDelta;
use serde::Serialize;

use crate::entry::Entry;

/// Key used when a field has no value for an entry.
pub const MISSING_KEY: &str = "(none)";

/// Separator between the parts of a composite group key.
pub const KEY_SEPARATOR: &str = "/";

type KeyFn = Box<dyn Fn(&Entry) -> String>;

/// How to derive one part of an entry's group key.
pub enum GroupSpec {
    /// The value of a report field (see [`Entry::field`]).
    Field(String),
    /// A named derivation function.
    Derived { name: String, key: KeyFn },
}

impl GroupSpec {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn derived(name: impl Into<String>, key: impl Fn(&Entry) -> String + 'static) -> Self {
        Self::Derived {
            name: name.into(),
            key: Box::new(key),
        }
    }

    /// Groups by the first heading tag.
    pub fn by_tag() -> Self {
        Self::derived("tag", |e| {
            e.tag_list()
                .first()
                .map_or_else(|| MISSING_KEY.to_string(), ToString::to_string)
        })
    }

    /// Groups by calendar day of the timestamp.
    pub fn by_day() -> Self {
        Self::derived("day", |e| {
            e.timestamp
                .map_or_else(|| MISSING_KEY.to_string(), |ts| ts.date().to_string())
        })
    }

    /// Resolves a command-line group name: `tag`, `day`, or a field name.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "tag" => Self::by_tag(),
            "day" => Self::by_day(),
            other => Self::field(other.to_ascii_uppercase()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Derived { name, .. } => name,
        }
    }

    fn key(&self, entry: &Entry) -> String {
        match self {
            Self::Field(name) => entry
                .field(name)
                .filter(|v| !v.is_empty())
                .map_or_else(|| MISSING_KEY.to_string(), Cow::into_owned),
            Self::Derived { key, .. } => key(entry),
        }
    }
}

impl fmt::Debug for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Derived { name, .. } => f.debug_struct("Derived").field("name", name).finish(),
        }
    }
}

/// A named partition of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Composite key; empty for the implicit all-entries group.
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Group {
    /// Sum of the reconstructed durations in this group.
    pub fn total(&self) -> TimeDelta {
        self.entries
            .iter()
            .filter_map(|e| e.duration)
            .fold(TimeDelta::zero(), |acc, d| acc + d)
    }
}

/// Partitions entries by the composite key of `specs`.
///
/// Groups are ordered by first appearance and entries keep their relative
/// order, so a chronological input gives chronological groups.
pub fn group(specs: &[GroupSpec], entries: Vec<Entry>) -> Vec<Group> {
    if specs.is_empty() {
        return vec![Group {
            name: String::new(),
            entries,
        }];
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let name = specs
            .iter()
            .map(|s| s.key(&entry))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            groups.push(Group {
                name,
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entries.push(entry);
    }

    tracing::debug!(groups = groups.len(), "grouped entries");
    groups
}

/// Aggregate row for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub entries: usize,
    pub seconds: f64,
}

/// Totals per group, in group order.
#[allow(clippy::cast_precision_loss)]
pub fn summarize(groups: &[Group]) -> Vec<GroupTotal> {
    groups
        .iter()
        .map(|g| GroupTotal {
            name: g.name.clone(),
            entries: g.entries.len(),
            seconds: g.total().num_microseconds().map_or(0.0, |us| us as f64 / 1_000_000.0),
        })
        .collect()
}
