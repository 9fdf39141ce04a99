//! Show command: one item's metrics and reconciled intervals.

use std::io::Write;

use anyhow::{Result, bail};
use chore_core::{CompletedInterval, Perception};
use clap::Args;
use serde::Serialize;

use crate::Config;
use crate::display::{ItemEntry, write_item};
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Name of the task.
    pub name: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ItemDetail<'a> {
    #[serde(flatten)]
    entry: ItemEntry,
    intervals: &'a [CompletedInterval],
    perceptions: &'a [Perception],
}

pub fn run<W: Write>(writer: &mut W, args: &ShowArgs, config: &Config) -> Result<()> {
    let store = Store::open(config, Access::Read)?;
    let registry = store.load()?;
    let Some(item) = registry.get(&args.name) else {
        bail!("no item named {:?}", args.name.trim());
    };

    if args.json {
        let detail = ItemDetail {
            entry: ItemEntry::from(item),
            intervals: item.intervals(),
            perceptions: item.perceptions(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&detail)?)?;
    } else {
        write_item(writer, item)?;
    }
    Ok(())
}
