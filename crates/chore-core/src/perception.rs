//! Perception events and the append-only log that holds them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// What the user reported about a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerceptionKind {
    /// "I noticed this needs doing."
    Observation,
    /// "I did this."
    Execution,
}

impl PerceptionKind {
    /// String representation for storage and interchange.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Execution => "execution",
        }
    }
}

impl fmt::Display for PerceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PerceptionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "observation" | "observe" | "seen" => Ok(Self::Observation),
            "execution" | "execute" | "done" => Ok(Self::Execution),
            _ => Err(ValidationError::UnknownPerceptionKind {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for PerceptionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PerceptionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single timestamped report about a tracked item.
///
/// Timestamps are plain integers in whatever unit the caller uses
/// consistently; the CLI uses seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perception {
    pub kind: PerceptionKind,
    pub timestamp: i64,
}

impl Perception {
    pub const fn new(kind: PerceptionKind, timestamp: i64) -> Self {
        Self { kind, timestamp }
    }

    pub const fn observation(timestamp: i64) -> Self {
        Self::new(PerceptionKind::Observation, timestamp)
    }

    pub const fn execution(timestamp: i64) -> Self {
        Self::new(PerceptionKind::Execution, timestamp)
    }

    pub const fn is_execution(&self) -> bool {
        matches!(self.kind, PerceptionKind::Execution)
    }
}

/// Insertion-ordered history of perceptions for one tracked item.
///
/// The log never reorders or removes entries and performs no validation on
/// append. Ordering policy is enforced by [`crate::TrackedItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerceptionLog {
    entries: Vec<Perception>,
}

impl PerceptionLog {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a perception to the end of the log.
    pub fn append(&mut self, perception: Perception) {
        self.entries.push(perception);
    }

    /// Returns the full history in insertion order.
    pub fn all(&self) -> &[Perception] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Perception> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops the most recently appended perception.
    ///
    /// Only used to roll back an append whose reconciliation failed.
    pub(crate) fn pop(&mut self) -> Option<Perception> {
        self.entries.pop()
    }
}

impl FromIterator<Perception> for PerceptionLog {
    fn from_iter<I: IntoIterator<Item = Perception>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
