//! Rendering tracked items for the terminal.
//!
//! This is the display adapter: it reads names and derived metrics and never
//! mutates an item.

use std::io::Write;

use anyhow::Result;
use chore_core::{CompletedInterval, TrackedItem};
use chrono::DateTime;
use serde::Serialize;

/// One row of the item table, also the JSON shape of `chore list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemEntry {
    pub name: String,
    pub average_duration: i64,
    pub next_due_date: i64,
    pub event_count: usize,
    pub interval_count: usize,
}

impl From<&TrackedItem> for ItemEntry {
    fn from(item: &TrackedItem) -> Self {
        let metrics = item.metrics();
        Self {
            name: item.name().to_string(),
            average_duration: metrics.average_duration,
            next_due_date: metrics.next_due_date,
            event_count: metrics.event_count,
            interval_count: metrics.interval_count,
        }
    }
}

/// Formats a duration in seconds as a short human string.
pub fn format_duration(secs: i64) -> String {
    if secs < 0 {
        return "0s".to_string();
    }
    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days >= 1 {
        format!("{days}d {}h", hours % 24)
    } else if hours >= 1 {
        format!("{hours}h {}m", minutes % 60)
    } else if minutes >= 1 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

/// Formats a Unix timestamp as `YYYY-MM-DD HH:MM` in UTC.
pub fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0).map_or_else(
        || ts.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Average column: `-` until there is at least one interval.
fn average_cell(entry: &ItemEntry) -> String {
    if entry.interval_count == 0 {
        "-".to_string()
    } else {
        format_duration(entry.average_duration)
    }
}

/// Due column: `-` until there is at least one execution.
fn due_cell(next_due_date: i64) -> String {
    if next_due_date == 0 {
        "-".to_string()
    } else {
        format_timestamp(next_due_date)
    }
}

/// Writes the item table.
pub fn write_table<W: Write>(writer: &mut W, entries: &[ItemEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No tracked items. Start one with `chore add <name>`.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<20}  {:>9}  {:<16}  {:>6}  {:>9}",
        "NAME", "AVERAGE", "NEXT DUE (UTC)", "EVENTS", "INTERVALS"
    )?;
    for entry in entries {
        writeln!(
            writer,
            "{:<20}  {:>9}  {:<16}  {:>6}  {:>9}",
            entry.name,
            average_cell(entry),
            due_cell(entry.next_due_date),
            entry.event_count,
            entry.interval_count
        )?;
    }
    Ok(())
}

/// Writes the detail view of one item.
pub fn write_item<W: Write>(writer: &mut W, item: &TrackedItem) -> Result<()> {
    let entry = ItemEntry::from(item);
    writeln!(writer, "{}", entry.name)?;
    writeln!(writer, "  average:   {}", average_cell(&entry))?;
    writeln!(writer, "  next due:  {}", due_cell(entry.next_due_date))?;
    writeln!(writer, "  events:    {}", entry.event_count)?;
    writeln!(writer, "  intervals: {}", entry.interval_count)?;
    for interval in item.intervals() {
        writeln!(writer, "    {}", interval_line(interval))?;
    }
    Ok(())
}

fn interval_line(interval: &CompletedInterval) -> String {
    format!(
        "{} -> {}  ({})",
        format_timestamp(interval.start()),
        format_timestamp(interval.end()),
        format_duration(interval.duration())
    )
}
