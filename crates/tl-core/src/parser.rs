//! Parsing of native log documents into entries.
//!
//! A document is a sequence of blocks, each opened by a `* ` heading line and
//! followed directly by a `:PROPERTIES:` ... `:END:` drawer. Whatever follows
//! the drawer up to the next heading is the entry body.
//!
//! Parsing never fails as a whole. A block without a complete drawer is
//! skipped and the next heading is parsed as usual.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{DEFAULT_TITLE, Entry, keys};
use crate::types::{EntryId, NAMESPACE, parse_timestamp};

/// Marker opening a property drawer.
pub const PROPERTIES_START: &str = ":PROPERTIES:";

/// Marker closing a property drawer.
pub const PROPERTIES_END: &str = ":END:";

static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:\s]+):(?:\s+(.*))?$").unwrap());

static HEADING_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(.*?)\s+)?(:[^\s]+:)$").unwrap());

/// Why a block was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Malformed {
    MissingDrawer,
    UnterminatedDrawer,
}

/// Parses concatenated document text into entries, in document order.
pub fn parse_document(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (line_num, block) in split_blocks(text) {
        match parse_block(&block) {
            Ok(entry) => entries.push(entry),
            Err(reason) => {
                skipped += 1;
                tracing::debug!(
                    line = line_num,
                    ?reason,
                    heading = %block[0],
                    "skipping malformed entry"
                );
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(
            parsed = entries.len(),
            skipped,
            "parsed document with malformed entries"
        );
    }
    entries
}

/// Returns true when `line` opens a new entry.
fn is_heading(line: &str) -> bool {
    line.starts_with("* ") || line == "*"
}

/// Splits text into heading-led blocks, paired with the heading's 1-based line.
///
/// Lines before the first heading belong to no entry and are dropped.
fn split_blocks(text: &str) -> Vec<(usize, Vec<&str>)> {
    let mut blocks: Vec<(usize, Vec<&str>)> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if is_heading(line) {
            blocks.push((idx + 1, vec![line]));
        } else if let Some((_, block)) = blocks.last_mut() {
            block.push(line);
        }
    }
    blocks
}

fn parse_block(lines: &[&str]) -> Result<Entry, Malformed> {
    let (heading_title, heading_tags) = parse_heading(lines[0]);

    let mut rest = lines[1..].iter();
    match rest.next() {
        Some(line) if line.trim() == PROPERTIES_START => {}
        _ => return Err(Malformed::MissingDrawer),
    }

    let mut entry = Entry::default();
    let mut terminated = false;
    for line in rest.by_ref() {
        let line = line.trim();
        if line == PROPERTIES_END {
            terminated = true;
            break;
        }
        let Some(caps) = PROPERTY_RE.captures(line) else {
            tracing::debug!(line, "ignoring unrecognized drawer line");
            continue;
        };
        let value = caps.get(2).map_or("", |m| m.as_str()).trim_end().to_string();
        match strip_namespace(&caps[1]) {
            Some(key) => {
                entry.properties.insert(key, value);
            }
            None => entry.foreign_properties.push((caps[1].to_string(), value)),
        }
    }
    if !terminated {
        return Err(Malformed::UnterminatedDrawer);
    }

    entry.id = entry
        .properties
        .get(keys::ID)
        .and_then(|id| EntryId::new(id.clone()).ok());
    entry.timestamp = entry
        .properties
        .get(keys::TIMESTAMP)
        .and_then(|ts| parse_timestamp(ts));
    // The drawer is authoritative; a title may itself end in `:word:`.
    let title_property = non_empty(entry.properties.get(keys::TITLE));
    let tags_property = non_empty(entry.properties.get(keys::TAGS));
    let heading_is_title = title_property.is_some_and(|t| t == heading_text(lines[0]));
    entry.tags = match tags_property {
        Some(tags) => Some(tags.to_string()),
        None if heading_is_title => None,
        None => heading_tags,
    };
    entry.title = title_property
        .map(ToString::to_string)
        .or(heading_title)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    entry.body = collect_body(rest.copied());

    Ok(entry)
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn heading_text(line: &str) -> &str {
    line.trim_start_matches('*').trim()
}

/// Splits a heading into its title and trailing `:tag:` group.
fn parse_heading(line: &str) -> (Option<String>, Option<String>) {
    let text = heading_text(line);
    let (title, tags) = match HEADING_TAGS_RE.captures(text) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).to_string(),
            Some(caps[2].to_string()),
        ),
        None => (text.to_string(), None),
    };
    let title = Some(title).filter(|t| !t.is_empty());
    (title, tags)
}

/// Returns the stored key for a namespaced property name.
fn strip_namespace(raw: &str) -> Option<String> {
    let upper = raw.to_ascii_uppercase();
    let key = upper.strip_prefix(NAMESPACE)?.strip_prefix('-')?;
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Returns true for a heading line behind any number of escaping commas.
pub(crate) fn is_escaped_heading(rest: &str) -> bool {
    is_heading(rest) || rest.strip_prefix(',').is_some_and(is_escaped_heading)
}

/// Joins body lines, dropping trailing blank lines and the comma escape the
/// writer puts in front of heading-like lines.
fn collect_body<'a>(lines: impl Iterator<Item = &'a str>) -> Option<String> {
    let lines: Vec<&str> = lines
        .map(|line| match line.strip_prefix(',') {
            Some(rest) if is_escaped_heading(rest) => rest,
            _ => line,
        })
        .collect();
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[..=end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
* Write report :work:docs:
:PROPERTIES:
:TIMELOG-ID: devbox-20240101100000000
:TIMELOG-TIMESTAMP: 2024-01-01 10:00:00.000000
:TIMELOG-project: quarterly
:END:
First paragraph.

Second paragraph.
";

    #[test]
    fn parses_heading_properties_and_body() {
        let entries = parse_document(WELL_FORMED);
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.title, "Write report");
        assert_eq!(entry.tags.as_deref(), Some(":work:docs:"));
        assert_eq!(
            entry.id.as_ref().map(EntryId::as_str),
            Some("devbox-20240101100000000")
        );
        assert_eq!(entry.timestamp, parse_timestamp("2024-01-01 10:00:00"));
        assert_eq!(
            entry.properties.get("PROJECT").map(String::as_str),
            Some("quarterly")
        );
        assert_eq!(
            entry.body.as_deref(),
            Some("First paragraph.\n\nSecond paragraph.")
        );
    }

    #[test]
    fn skips_entry_missing_property_block() {
        let text = format!("* No drawer here\njust text\n\n{WELL_FORMED}");
        let entries = parse_document(&text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Write report");
    }

    #[test]
    fn skips_unterminated_drawer_without_swallowing_next_entry() {
        let text = format!("* Broken\n:PROPERTIES:\n:TIMELOG-ID: x\n{WELL_FORMED}");
        let entries = parse_document(&text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Write report");
    }

    #[test]
    fn preserves_document_order() {
        let text = "\
* Later
:PROPERTIES:
:TIMELOG-TIMESTAMP: 2024-01-02 09:00:00
:END:
* Earlier
:PROPERTIES:
:TIMELOG-TIMESTAMP: 2024-01-01 09:00:00
:END:
";
        let titles: Vec<_> = parse_document(text).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Later", "Earlier"]);
    }

    #[test]
    fn keeps_entry_with_unparseable_timestamp() {
        let text = "* Odd\n:PROPERTIES:\n:TIMELOG-TIMESTAMP: sometime\n:END:\n";
        let entries = parse_document(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, None);
        assert_eq!(
            entries[0].properties.get("TIMESTAMP").map(String::as_str),
            Some("sometime")
        );
    }

    #[test]
    fn foreign_properties_are_kept_apart() {
        let text = "* Call\n:PROPERTIES:\n:CATEGORY: phone\n:TIMELOG-ID: a\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(
            entry.foreign_properties,
            vec![("CATEGORY".to_string(), "phone".to_string())]
        );
        assert!(!entry.properties.contains_key("CATEGORY"));
    }

    #[test]
    fn empty_heading_gets_placeholder_title() {
        let text = "* \n:PROPERTIES:\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.title, DEFAULT_TITLE);
        assert_eq!(entry.tags, None);
        assert_eq!(entry.body, None);
    }

    #[test]
    fn title_and_tags_fall_back_to_properties() {
        let text = "* \n:PROPERTIES:\n:TIMELOG-TITLE: From drawer\n:TIMELOG-TAGS: :a:\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.title, "From drawer");
        assert_eq!(entry.tags.as_deref(), Some(":a:"));
    }

    #[test]
    fn drawer_title_wins_over_heading_split() {
        let text = "* Fix :bug:\n:PROPERTIES:\n:TIMELOG-TITLE: Fix :bug:\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.title, "Fix :bug:");
        assert_eq!(entry.tags, None);

        let text = "\
* Fix :bug: :work:
:PROPERTIES:
:TIMELOG-TITLE: Fix :bug:
:TIMELOG-TAGS: :work:
:END:
";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.title, "Fix :bug:");
        assert_eq!(entry.tags.as_deref(), Some(":work:"));
    }

    #[test]
    fn heading_tags_apply_when_drawer_has_none() {
        let text = "* Meeting :work:\n:PROPERTIES:\n:TIMELOG-TITLE: Meeting\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.title, "Meeting");
        assert_eq!(entry.tags.as_deref(), Some(":work:"));
    }

    #[test]
    fn tags_only_heading() {
        let (title, tags) = parse_heading("* :solo:");
        assert_eq!(title, None);
        assert_eq!(tags.as_deref(), Some(":solo:"));
    }

    #[test]
    fn sub_headings_stay_in_body() {
        let text = "* Top\n:PROPERTIES:\n:END:\n** detail\nmore\n";
        let entries = parse_document(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body.as_deref(), Some("** detail\nmore"));
    }

    #[test]
    fn text_before_first_heading_is_ignored() {
        let text = "#+TITLE: log\n\n* Only\n:PROPERTIES:\n:END:\n";
        assert_eq!(parse_document(text).len(), 1);
        assert!(parse_document("no headings at all").is_empty());
        assert!(parse_document("").is_empty());
    }

    #[test]
    fn escaped_heading_lines_are_unescaped() {
        let text = "* Notes\n:PROPERTIES:\n:END:\n,* quoted\n,,* twice\n, plain comma\n";
        let entry = &parse_document(text)[0];
        assert_eq!(
            entry.body.as_deref(),
            Some("* quoted\n,* twice\n, plain comma")
        );
    }

    #[test]
    fn empty_property_value_is_kept() {
        let text = "* Blank\n:PROPERTIES:\n:TIMELOG-NOTE:\n:END:\n";
        let entry = &parse_document(text)[0];
        assert_eq!(entry.properties.get("NOTE").map(String::as_str), Some(""));
    }
}
