//! Report renderers.
//!
//! Renderers consume the reconstructed, filtered and grouped timeline and
//! produce a [`Report`]. An empty timeline is a valid report with no rows.

use crate::entry::Entry;
use crate::grouping::Group;
use crate::writer::render_entry;

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    /// Number of entries rendered.
    pub rows: usize,
    /// Number of lines in `text`, headers included.
    pub lines: usize,
}

impl Report {
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Renders grouped entries into some textual format.
pub trait Exporter {
    fn export(&self, groups: &[Group]) -> Report;
}

fn entries(groups: &[Group]) -> impl Iterator<Item = &Entry> {
    groups.iter().flat_map(|g| g.entries.iter())
}

/// Comma-separated report of selected fields.
///
/// Header and rows join their cells with `", "`; every row value is
/// double-quoted and missing values render as `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExporter {
    fields: Vec<String>,
}

impl CsvExporter {
    /// Field names are given without the namespace prefix.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| f.into().trim().to_string())
                .collect(),
        }
    }

    fn row(&self, entry: &Entry) -> String {
        self.fields
            .iter()
            .map(|f| quote(&entry.field(f).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

impl Exporter for CsvExporter {
    fn export(&self, groups: &[Group]) -> Report {
        let mut lines = vec![self.fields.join(", ")];
        lines.extend(entries(groups).map(|e| self.row(e)));
        let rows = lines.len() - 1;
        Report {
            lines: lines.len(),
            text: lines.join("\n"),
            rows,
        }
    }
}

/// Consolidated document in the native log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentExporter;

impl Exporter for DocumentExporter {
    fn export(&self, groups: &[Group]) -> Report {
        let blocks: Vec<String> = entries(groups).map(render_entry).collect();
        let text = blocks.join("\n");
        Report {
            rows: blocks.len(),
            lines: text.lines().count(),
            text,
        }
    }
}
