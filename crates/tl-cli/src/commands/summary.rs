//! Per-group time totals (`tl summary`).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::Serialize;
use tl_core::{Group, GroupTotal, Period, Query, SourceStore, load_groups, summarize};

/// Label for the single group of an ungrouped summary.
const ALL_LABEL: &str = "(all)";

/// Format a duration as "Xh Ym" or "Xm".
pub fn format_duration(delta: TimeDelta) -> String {
    if delta < TimeDelta::zero() {
        return "0m".to_string();
    }
    let total_minutes = delta.num_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<String>,
    groups: Vec<GroupTotal>,
    total_seconds: f64,
}

/// Renders the human-readable summary.
pub fn format_summary(groups: &[Group], period: Option<&Period>) -> String {
    let mut output = String::new();

    let title = period.map_or_else(|| "all time".to_string(), ToString::to_string);
    writeln!(output, "SUMMARY: {title}").unwrap();
    writeln!(output, "────────").unwrap();

    let entries: usize = groups.iter().map(|g| g.entries.len()).sum();
    if entries == 0 {
        writeln!(output, "No entries in this period.").unwrap();
        return output;
    }

    let width = groups
        .iter()
        .map(|g| label(g).chars().count())
        .max()
        .unwrap_or(0)
        .max(ALL_LABEL.len());

    let mut total = TimeDelta::zero();
    for group in groups {
        let duration = group.total();
        total += duration;
        let count = group.entries.len();
        let noun = if count == 1 { "entry" } else { "entries" };
        writeln!(
            output,
            "{:<width$}  {:>8}  ({count} {noun})",
            label(group),
            format_duration(duration),
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<width$}  {:>8}  ({entries} entries)",
        "Total",
        format_duration(total),
    )
    .unwrap();
    output
}

fn label(group: &Group) -> &str {
    if group.name.is_empty() {
        ALL_LABEL
    } else {
        &group.name
    }
}

fn format_json(groups: &[Group], period: Option<&Period>) -> Result<String> {
    let totals = summarize(groups);
    let summary = JsonSummary {
        period: period.map(ToString::to_string),
        total_seconds: totals.iter().map(|t| t.seconds).sum(),
        groups: totals,
    };
    serde_json::to_string_pretty(&summary).context("failed to serialize summary")
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &impl SourceStore,
    query: &Query,
    json: bool,
) -> Result<()> {
    let groups = load_groups(store, query).context("failed to load timeline")?;
    if json {
        writeln!(writer, "{}", format_json(&groups, query.period.as_ref())?)?;
    } else {
        write!(writer, "{}", format_summary(&groups, query.period.as_ref()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use tl_core::{GroupSpec, MemoryStore};

    const LOG: &str = "\
* Planning :work:
:PROPERTIES:
:TIMELOG-ID: a
:TIMELOG-TIMESTAMP: 2024-01-01 09:00:00
:END:
* Lunch :break:
:PROPERTIES:
:TIMELOG-ID: b
:TIMELOG-TIMESTAMP: 2024-01-01 12:30:00
:END:
* Coding :work:
:PROPERTIES:
:TIMELOG-ID: c
:TIMELOG-TIMESTAMP: 2024-01-01 13:15:00
:END:
* Done
:PROPERTIES:
:TIMELOG-ID: d
:TIMELOG-TIMESTAMP: 2024-01-01 17:00:00
:END:
";

    fn store() -> MemoryStore {
        MemoryStore::with_documents([("host.org", LOG)])
    }

    fn render(query: &Query, json: bool) -> String {
        let mut out = Vec::new();
        run(&mut out, &store(), query, json).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(45)), "45m");
        assert_eq!(format_duration(TimeDelta::minutes(135)), "2h 15m");
        assert_eq!(format_duration(TimeDelta::seconds(59)), "0m");
        assert_eq!(format_duration(TimeDelta::minutes(-5)), "0m");
    }

    #[test]
    fn test_summary_by_tag() {
        let query = Query::default().grouped_by(GroupSpec::by_tag());
        assert_snapshot!(render(&query, false), @r"
        SUMMARY: all time
        ────────
        work      7h 15m  (2 entries)
        break        45m  (1 entry)
        (none)        0m  (1 entry)

        Total      8h 0m  (4 entries)
        ");
    }

    #[test]
    fn test_ungrouped_summary() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = Query::new(Some(Period::day(day)));
        assert_snapshot!(render(&query, false), @r"
        SUMMARY: 2024-01-01..2024-01-01
        ────────
        (all)     8h 0m  (4 entries)

        Total     8h 0m  (4 entries)
        ");
    }

    #[test]
    fn test_empty_period() {
        let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let query = Query::new(Some(Period::day(day)));
        assert_snapshot!(render(&query, false), @r"
        SUMMARY: 2023-01-01..2023-01-01
        ────────
        No entries in this period.
        ");
    }

    #[test]
    fn test_json_summary() {
        let query = Query::default().grouped_by(GroupSpec::by_tag());
        let value: serde_json::Value = serde_json::from_str(&render(&query, true)).unwrap();
        assert_eq!(value["total_seconds"], 28800.0);
        assert_eq!(value["groups"][0]["name"], "work");
        assert_eq!(value["groups"][0]["entries"], 2);
        assert_eq!(value["groups"][0]["seconds"], 26100.0);
        assert!(value.get("period").is_none());
    }
}
