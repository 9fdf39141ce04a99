//! List command: every tracked item with its derived metrics.

use std::io::Write;

use anyhow::Result;
use chore_core::{Registry, SortKey, SortOrder};
use clap::Args;

use crate::Config;
use crate::display::{ItemEntry, write_table};
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Sort by `name`, `average` or `due`. Defaults to the configured sort.
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let store = Store::open(config, Access::Read)?;
    let registry = store.load()?;

    let key = args.sort.unwrap_or(config.default_sort);
    let order = if args.desc {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let entries = entries(&registry, key, order);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write_table(writer, &entries)?;
    }
    Ok(())
}

/// Sorted display rows for the registry.
pub fn entries(registry: &Registry, key: SortKey, order: SortOrder) -> Vec<ItemEntry> {
    registry
        .sorted(key, order)
        .into_iter()
        .map(ItemEntry::from)
        .collect()
}
