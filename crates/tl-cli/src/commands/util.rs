//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeDelta};
use regex::Regex;
use tl_core::{GroupSpec, Period, PeriodPreset};

use crate::PeriodArgs;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative dates (~1000 years in days).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// The current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date string as either `YYYY-MM-DD` or a relative day.
///
/// Supports:
/// - ISO dates: "2024-01-15"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - TimeDelta::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!("Invalid date: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or 'N days ago'");
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date value too large: {n} {}", &caps[2]);
    }

    today
        .checked_sub_signed(TimeDelta::days(n * days_per_unit))
        .with_context(|| format!("date out of range: {s}"))
}

/// Turns the period options into a period; `None` means everything.
pub fn resolve_period(args: &PeriodArgs, today: NaiveDate) -> Result<Option<Period>> {
    if let Some(name) = &args.period {
        let preset: PeriodPreset = name.parse()?;
        return Ok(Some(Period::preset(preset, today)));
    }

    let from = args
        .from
        .as_deref()
        .map(|s| parse_date(s, today))
        .transpose()?;
    let to = args
        .to
        .as_deref()
        .map(|s| parse_date(s, today))
        .transpose()?;

    let period = match (from, to) {
        (None, None) => return Ok(None),
        (Some(start), None) => Period::new(start, today.max(start))?,
        (None, Some(end)) => Period::new(NaiveDate::MIN, end)?,
        (Some(start), Some(end)) => Period::new(start, end)?,
    };
    Ok(Some(period))
}

/// Parses `--group-by` values in order.
pub fn group_specs(names: &[String]) -> Vec<GroupSpec> {
    names.iter().map(|n| GroupSpec::parse(n)).collect()
}
