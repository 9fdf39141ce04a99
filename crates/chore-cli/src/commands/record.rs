//! Observe and done commands: record a perception on an existing task.

use std::io::Write;

use anyhow::Result;
use chore_core::{PerceptionKind, Registry};
use clap::Args;

use super::util::resolve_timestamp;
use crate::Config;
use crate::display::format_timestamp;
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Name of the task.
    pub name: String,

    /// When it happened: ISO 8601 or relative ("3 hours ago"). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &RecordArgs,
    kind: PerceptionKind,
    config: &Config,
) -> Result<()> {
    let timestamp = resolve_timestamp(args.at.as_deref())?;

    let mut store = Store::open(config, Access::Write)?;
    let mut registry = store.load()?;
    let summary = record(&mut registry, &args.name, kind, timestamp)?;
    store.save(&registry)?;

    writeln!(writer, "{summary}")?;
    Ok(())
}

/// Records the perception and describes the item's new due date.
pub fn record(
    registry: &mut Registry,
    name: &str,
    kind: PerceptionKind,
    timestamp: i64,
) -> Result<String> {
    let item = registry.record(name, kind, timestamp)?;
    let due = match item.next_due_date() {
        0 => "no due date yet".to_string(),
        ts => format!("next due {} UTC", format_timestamp(ts)),
    };
    Ok(format!("Recorded {kind} for {} ({due})", item.name()))
}
