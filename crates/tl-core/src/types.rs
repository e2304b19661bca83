//! Core type definitions with validation.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal prefix marking the log system's own properties (`:TIMELOG-ID: ...`).
pub const NAMESPACE: &str = "TIMELOG";

/// Canonical textual timestamp encoding.
///
/// Fixed width with microseconds, so entries written on different machines
/// sort lexicographically in chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A period whose start falls after its end.
    #[error("period start {start} is after period end {end}")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },

    /// Unknown named period.
    #[error("unknown period preset: {value}")]
    UnknownPreset { value: String },

    /// A property key that cannot appear in a property line.
    #[error("invalid property key: {key:?}")]
    InvalidPropertyKey { key: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated entry identifier.
    ///
    /// Built from a host identifier and a millisecond timestamp. Uniqueness is
    /// best-effort and never checked; ids are for traceability only.
    EntryId, "entry ID"
);

define_string_id!(
    /// A validated host identifier used as the id prefix of new entries.
    HostId, "host ID"
);

impl EntryId {
    /// Builds the id for an entry created on `host` at `at`.
    pub fn generate(host: &HostId, at: NaiveDateTime) -> Self {
        Self(format!("{host}-{}", at.format("%Y%m%d%H%M%S%3f")))
    }
}

/// Formats a timestamp in the canonical sortable encoding.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Accepts the canonical encoding as well as values with no or a shorter
/// fractional part. Returns `None` for anything else.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Renders a duration as decimal seconds.
///
/// Whole seconds keep one decimal place (`7200.0`); fractional values print
/// only the digits they need.
pub fn format_duration_secs(delta: TimeDelta) -> String {
    let secs = delta.num_seconds();
    let micros = (delta.subsec_nanos() / 1_000).unsigned_abs();
    if micros == 0 {
        return format!("{secs}.0");
    }
    let sign = if secs == 0 && delta < TimeDelta::zero() {
        "-"
    } else {
        ""
    };
    let fraction = format!("{micros:06}");
    format!("{sign}{secs}.{}", fraction.trim_end_matches('0'))
}
