//! Due command: tasks whose next due date has passed.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::util::resolve_timestamp;
use crate::Config;
use crate::display::{ItemEntry, write_table};
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct DueArgs {
    /// Reference time: ISO 8601 or relative. Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &DueArgs, config: &Config) -> Result<()> {
    let now = resolve_timestamp(args.at.as_deref())?;
    let store = Store::open(config, Access::Read)?;
    let registry = store.load()?;

    let entries: Vec<ItemEntry> = registry
        .overdue(now)
        .into_iter()
        .map(ItemEntry::from)
        .collect();
    if entries.is_empty() {
        writeln!(writer, "Nothing is due.")?;
        return Ok(());
    }
    write_table(writer, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chore_core::{PerceptionKind, Registry, SortKey};
    use insta::assert_snapshot;

    const JAN_15: i64 = 1_768_471_200;
    const DAY: i64 = 86_400;

    fn setup(dir: &std::path::Path) -> Config {
        let config = Config {
            database_path: dir.join("chore.db"),
            default_sort: SortKey::default(),
        };
        let mut registry = Registry::new();
        registry.create("water plant").unwrap();
        registry
            .record("water plant", PerceptionKind::Execution, JAN_15)
            .unwrap();
        registry
            .record("water plant", PerceptionKind::Observation, JAN_15 + 2 * DAY)
            .unwrap();
        registry.create("descale kettle").unwrap();
        registry
            .record("descale kettle", PerceptionKind::Observation, JAN_15)
            .unwrap();
        Store::open(&config, Access::Write)
            .unwrap()
            .save(&registry)
            .unwrap();
        config
    }

    #[test]
    fn due_lists_overdue_items() {
        let temp = tempfile::tempdir().unwrap();
        let config = setup(temp.path());
        let args = DueArgs {
            at: Some("2026-01-18T00:00:00Z".to_string()),
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        NAME                    AVERAGE  NEXT DUE (UTC)    EVENTS  INTERVALS
        water plant               2d 0h  2026-01-17 10:00       2          1
        ");
    }

    #[test]
    fn due_reports_nothing_before_due_date() {
        let temp = tempfile::tempdir().unwrap();
        let config = setup(temp.path());
        let args = DueArgs {
            at: Some("2026-01-16T00:00:00Z".to_string()),
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Nothing is due.\n");
    }
}
