//! Import command: load JSON lines produced by `chore export`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chore_core::{Registry, TrackedItem};
use clap::Args;

use super::export::ItemRecord;
use crate::Config;
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Skip items whose name is already tracked instead of failing.
    #[arg(long)]
    pub skip_existing: bool,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Imports every line or nothing: the store is only written if all lines parse.
pub fn run<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    args: &ImportArgs,
    config: &Config,
) -> Result<ImportSummary> {
    let items = parse_items(reader)?;

    let mut store = Store::open(config, Access::Write)?;
    let mut registry = store.load()?;
    let summary = merge(&mut registry, items, args.skip_existing)?;
    store.save(&registry)?;

    writeln!(
        writer,
        "Imported {} items ({} skipped)",
        summary.imported, summary.skipped
    )?;
    Ok(summary)
}

/// Parses JSON lines into items, tagging each with its line number.
fn parse_items<R: BufRead>(reader: R) -> Result<Vec<(usize, TrackedItem)>> {
    let mut items = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: ItemRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {line_no}"))?;
        let item = record
            .into_item()
            .with_context(|| format!("invalid item on line {line_no}"))?;
        items.push((line_no, item));
    }
    Ok(items)
}

fn merge(
    registry: &mut Registry,
    items: Vec<(usize, TrackedItem)>,
    skip_existing: bool,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        imported: 0,
        skipped: 0,
    };
    for (line_no, item) in items {
        if registry.contains(item.name().as_str()) {
            if skip_existing {
                tracing::debug!(item = %item.name(), line_no, "existing item skipped");
                summary.skipped += 1;
                continue;
            }
            bail!(
                "line {line_no}: an item named {:?} already exists",
                item.name().as_str()
            );
        }
        registry.insert(item)?;
        summary.imported += 1;
    }
    Ok(summary)
}
