//! Timeline reconstruction.
//!
//! Entries merged from any number of source documents are put in
//! chronological order and each one is annotated with how long it stayed the
//! current activity, i.e. the time until the next entry started.
//!
//! # Algorithm
//!
//! 1. Drop entries without a timestamp
//! 2. Stable sort by timestamp (ties keep their input order)
//! 3. Single adjacent-pair scan: `duration = next.timestamp - timestamp`
//! 4. The last entry is still ongoing and gets a zero duration
//!
//! The result depends only on the set of entries given, which is what lets
//! machines append to their own files and merge at read time.

use chrono::TimeDelta;

use crate::entry::Entry;

/// Sorts entries chronologically and computes their durations.
pub fn reconstruct(entries: Vec<Entry>) -> Vec<Entry> {
    let total = entries.len();
    let mut timeline: Vec<Entry> = entries
        .into_iter()
        .filter(|e| e.timestamp.is_some())
        .collect();

    let unordered = total - timeline.len();
    if unordered > 0 {
        tracing::debug!(unordered, "excluding entries without a timestamp");
    }

    timeline.sort_by_key(|e| e.timestamp);

    let next_starts: Vec<_> = timeline.iter().skip(1).map(|e| e.timestamp).collect();
    for (entry, next) in timeline.iter_mut().zip(next_starts) {
        let delta = match (entry.timestamp, next) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        };
        entry.set_duration(delta, false);
    }
    if let Some(last) = timeline.last_mut() {
        last.set_duration(TimeDelta::zero(), true);
    }

    tracing::debug!(entries = timeline.len(), "reconstructed timeline");
    timeline
}

/// Wall-clock span covered by a reconstructed timeline.
pub fn span(timeline: &[Entry]) -> TimeDelta {
    match (
        timeline.first().and_then(|e| e.timestamp),
        timeline.last().and_then(|e| e.timestamp),
    ) {
        (Some(first), Some(last)) => last - first,
        _ => TimeDelta::zero(),
    }
}
