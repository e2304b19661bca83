//! Inclusive, day-granular reporting periods.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::entry::Entry;
use crate::types::ValidationError;

/// An inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Creates a period, rejecting a start after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// A period covering a single day.
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant of the start day.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last representable instant of the end day (`23:59:59.999999`).
    ///
    /// Stays within the end day, so it holds for `NaiveDate::MAX` too.
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + (TimeDelta::days(1) - TimeDelta::microseconds(1))
    }

    /// Returns true when `ts` falls inside the period, both ends included.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start_instant() && ts <= self.end_instant()
    }

    /// Resolves a named preset relative to `today`.
    pub fn preset(preset: PeriodPreset, today: NaiveDate) -> Self {
        match preset {
            PeriodPreset::Today => Self::day(today),
            PeriodPreset::Yesterday => Self::day(today - TimeDelta::days(1)),
            PeriodPreset::Week => week_of(today),
            PeriodPreset::LastWeek => week_of(today - TimeDelta::days(7)),
            PeriodPreset::Month => month_of(today),
            PeriodPreset::LastMonth => month_of(
                today
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(today),
            ),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Monday through Sunday of the week containing `date`.
fn week_of(date: NaiveDate) -> Period {
    let monday = date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()));
    Period {
        start: monday,
        end: monday + TimeDelta::days(6),
    }
}

/// First through last day of the month containing `date`.
fn month_of(date: NaiveDate) -> Period {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .map_or(date, |next| next - TimeDelta::days(1));
    Period {
        start: first,
        end: last,
    }
}

/// Named periods relative to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    Today,
    Yesterday,
    Week,
    LastWeek,
    Month,
    LastMonth,
}

impl fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Week => "week",
            Self::LastWeek => "last-week",
            Self::Month => "month",
            Self::LastMonth => "last-month",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PeriodPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" | "day" => Ok(Self::Today),
            "yesterday" | "last-day" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            "last-week" => Ok(Self::LastWeek),
            "month" => Ok(Self::Month),
            "last-month" => Ok(Self::LastMonth),
            _ => Err(ValidationError::UnknownPreset {
                value: s.to_string(),
            }),
        }
    }
}

/// Keeps the entries whose timestamp lies in `period`.
///
/// `None` means no filtering. Entries without a timestamp can never be shown
/// to be in range and are always dropped.
pub fn filter(period: Option<&Period>, entries: Vec<Entry>) -> Vec<Entry> {
    let before = entries.len();
    let kept: Vec<Entry> = entries
        .into_iter()
        .filter(|e| match (e.timestamp, period) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(ts), Some(p)) => p.contains(ts),
        })
        .collect();
    tracing::debug!(
        period = %period.map_or_else(|| "all".to_string(), ToString::to_string),
        before,
        kept = kept.len(),
        "filtered entries by period"
    );
    kept
}
