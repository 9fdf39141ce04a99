//! Tracked items: a named perception log plus its reconciled intervals.

use thiserror::Error;

use crate::interval::{CompletedInterval, IntervalError};
use crate::metrics::{self, Metrics};
use crate::perception::{Perception, PerceptionKind, PerceptionLog};
use crate::reconcile::reconcile;
use crate::types::{ItemName, ValidationError};

/// Errors raised while recording perceptions on a tracked item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Perceptions must be recorded in non-decreasing timestamp order.
    #[error("perception at {attempted} is earlier than the last recorded perception at {last}")]
    OutOfOrder { last: i64, attempted: i64 },

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// A recurring task and everything recorded about it.
///
/// The only mutation is [`TrackedItem::record_perception`]. Intervals are
/// rebuilt from the whole log on every append, so every derived value is
/// current as soon as that call returns.
///
/// # Ordering
///
/// Timestamps must be non-decreasing. A perception earlier than the last one
/// recorded is rejected with [`ItemError::OutOfOrder`] and the item is left
/// unchanged. Equal timestamps are accepted and give zero-length intervals.
/// As a result reconciliation of an item's log never sees an inverted pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    name: ItemName,
    log: PerceptionLog,
    intervals: Vec<CompletedInterval>,
}

impl TrackedItem {
    /// Creates an item with an empty history.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self::with_name(ItemName::new(name)?))
    }

    pub const fn with_name(name: ItemName) -> Self {
        Self {
            name,
            log: PerceptionLog::new(),
            intervals: Vec::new(),
        }
    }

    /// Creates an item whose history starts with `seed`.
    pub fn with_seed(name: impl Into<String>, seed: Perception) -> Result<Self, ItemError> {
        let mut item = Self::new(name)?;
        item.record(seed)?;
        Ok(item)
    }

    /// Rebuilds an item from a stored history.
    ///
    /// Equivalent to recording each perception in order, so the derived
    /// metrics match those of the item the history was taken from.
    pub fn from_perceptions<I>(name: ItemName, perceptions: I) -> Result<Self, ItemError>
    where
        I: IntoIterator<Item = Perception>,
    {
        let mut last: Option<i64> = None;
        let mut log = PerceptionLog::new();
        for perception in perceptions {
            check_order(last, perception.timestamp)?;
            last = Some(perception.timestamp);
            log.append(perception);
        }
        let intervals = reconcile(log.all())?;
        Ok(Self {
            name,
            log,
            intervals,
        })
    }

    /// Appends a perception and synchronously recomputes the intervals.
    pub fn record_perception(
        &mut self,
        kind: PerceptionKind,
        timestamp: i64,
    ) -> Result<(), ItemError> {
        self.record(Perception::new(kind, timestamp))
    }

    /// Appends an already-built perception. See [`Self::record_perception`].
    pub fn record(&mut self, perception: Perception) -> Result<(), ItemError> {
        check_order(self.log.last().map(|p| p.timestamp), perception.timestamp).inspect_err(
            |err| tracing::warn!(item = %self.name, %err, "perception rejected"),
        )?;

        self.log.append(perception);
        match reconcile(self.log.all()) {
            Ok(intervals) => self.intervals = intervals,
            Err(err) => {
                self.log.pop();
                return Err(err.into());
            }
        }

        tracing::debug!(
            item = %self.name,
            kind = %perception.kind,
            ts = perception.timestamp,
            intervals = self.intervals.len(),
            "perception recorded"
        );
        Ok(())
    }

    pub const fn name(&self) -> &ItemName {
        &self.name
    }

    /// Full history in insertion order.
    pub fn perceptions(&self) -> &[Perception] {
        self.log.all()
    }

    pub fn intervals(&self) -> &[CompletedInterval] {
        &self.intervals
    }

    pub fn average_duration(&self) -> i64 {
        metrics::average_duration(&self.intervals)
    }

    pub fn next_due_date(&self) -> i64 {
        metrics::next_due_date(self.log.all(), self.average_duration())
    }

    pub fn event_count(&self) -> usize {
        metrics::event_count(self.log.all())
    }

    pub fn interval_count(&self) -> usize {
        metrics::interval_count(&self.intervals)
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(self.log.all(), &self.intervals)
    }

    /// Whether the task has come due at `now`.
    ///
    /// Items with no execution yet have no due date and are never overdue.
    pub fn is_overdue(&self, now: i64) -> bool {
        let due = self.next_due_date();
        due != 0 && now >= due
    }
}

fn check_order(last: Option<i64>, attempted: i64) -> Result<(), ItemError> {
    match last {
        Some(last) if attempted < last => Err(ItemError::OutOfOrder { last, attempted }),
        _ => Ok(()),
    }
}
