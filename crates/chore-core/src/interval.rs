//! Completed intervals produced by reconciliation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when an interval would break its ordering invariant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    /// The start of the span lies after its end.
    #[error("interval start {start} is after its end {end}")]
    Inverted { start: i64, end: i64 },

    /// The span is wider than an `i64` duration can hold.
    #[error("interval from {start} to {end} is too long to measure")]
    TooLong { start: i64, end: i64 },
}

/// A reconciled span between two accepted perceptions.
///
/// Only the endpoints are kept; which kinds produced the span does not matter
/// downstream. `start <= end` always holds and `end - start` fits in an
/// `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct CompletedInterval {
    start: i64,
    end: i64,
}

impl CompletedInterval {
    /// Creates an interval, failing if `start > end` or the span overflows.
    ///
    /// The endpoints are never swapped or clamped.
    pub const fn new(start: i64, end: i64) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::Inverted { start, end });
        }
        if end.checked_sub(start).is_none() {
            return Err(IntervalError::TooLong { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> i64 {
        self.start
    }

    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Length of the span. Never negative.
    pub const fn duration(&self) -> i64 {
        self.end - self.start
    }
}

#[derive(Deserialize)]
struct RawInterval {
    start: i64,
    end: i64,
}

impl TryFrom<RawInterval> for CompletedInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}
