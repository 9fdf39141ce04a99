//! Export command: every item's name and history as JSON lines.
//!
//! One item per line:
//!
//! ```json
//! {"name":"water plant","perceptions":[{"kind":"execution","timestamp":100}]}
//! ```
//!
//! Intervals are not exported; `chore import` rebuilds them by replay.

use std::io::Write;

use anyhow::{Context, Result};
use chore_core::{ItemError, ItemName, Perception, Registry, TrackedItem};
use serde::{Deserialize, Serialize};

use crate::Config;
use crate::store::{Access, Store};

/// Interchange form of a tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: ItemName,
    #[serde(default)]
    pub perceptions: Vec<Perception>,
}

impl From<&TrackedItem> for ItemRecord {
    fn from(item: &TrackedItem) -> Self {
        Self {
            name: item.name().clone(),
            perceptions: item.perceptions().to_vec(),
        }
    }
}

impl ItemRecord {
    /// Replays the history into a tracked item.
    pub fn into_item(self) -> Result<TrackedItem, ItemError> {
        TrackedItem::from_perceptions(self.name, self.perceptions)
    }
}

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<usize> {
    let store = Store::open(config, Access::Read)?;
    let registry = store.load()?;
    write_records(writer, &registry)
}

/// Writes one JSON line per item, returning how many were written.
pub fn write_records<W: Write>(writer: &mut W, registry: &Registry) -> Result<usize> {
    for item in registry {
        let json = serde_json::to_string(&ItemRecord::from(item))
            .with_context(|| format!("failed to serialize {}", item.name()))?;
        writeln!(writer, "{json}")?;
    }
    Ok(registry.len())
}
