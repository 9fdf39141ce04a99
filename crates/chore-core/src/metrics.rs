//! Scheduling metrics derived from a perception history and its intervals.

use serde::{Deserialize, Serialize};

use crate::interval::CompletedInterval;
use crate::perception::Perception;

/// Snapshot of every derived value a display layer reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean interval duration, truncated toward zero. 0 with no intervals.
    pub average_duration: i64,
    /// Latest execution plus the average duration. 0 with no executions.
    pub next_due_date: i64,
    pub event_count: usize,
    pub interval_count: usize,
}

impl Metrics {
    /// Computes all metrics from a history and its reconciled intervals.
    pub fn compute(perceptions: &[Perception], intervals: &[CompletedInterval]) -> Self {
        let average_duration = average_duration(intervals);
        Self {
            average_duration,
            next_due_date: next_due_date(perceptions, average_duration),
            event_count: event_count(perceptions),
            interval_count: interval_count(intervals),
        }
    }
}

/// Arithmetic mean of interval durations, truncated toward zero.
///
/// Deliberately crude: no weighting, decay or outlier handling.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn average_duration(intervals: &[CompletedInterval]) -> i64 {
    if intervals.is_empty() {
        return 0;
    }
    let total: i128 = intervals.iter().map(|i| i128::from(i.duration())).sum();
    // Each duration fits in i64 (see `CompletedInterval::new`), so the mean does too.
    (total / intervals.len() as i128) as i64
}

/// Latest execution timestamp in the raw history plus `average_duration`.
///
/// Looks at every execution in the log regardless of reconciliation state.
pub fn next_due_date(perceptions: &[Perception], average_duration: i64) -> i64 {
    perceptions
        .iter()
        .filter(|p| p.is_execution())
        .map(|p| p.timestamp)
        .max()
        .map_or(0, |last| last.saturating_add(average_duration))
}

pub const fn event_count(perceptions: &[Perception]) -> usize {
    perceptions.len()
}

pub const fn interval_count(intervals: &[CompletedInterval]) -> usize {
    intervals.len()
}
