//! Add command for starting to track a new recurring task.

use std::io::Write;

use anyhow::{Result, bail};
use chore_core::{Perception, PerceptionKind, Registry};
use clap::Args;

use super::util::resolve_timestamp;
use crate::Config;
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Name of the task (e.g. "water the plant").
    pub name: String,

    /// Seed the history with an observation.
    #[arg(long, conflicts_with = "done")]
    pub observed: bool,

    /// Seed the history with an execution.
    #[arg(long)]
    pub done: bool,

    /// When the seed happened: ISO 8601 or relative ("2 days ago"). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

impl AddArgs {
    const fn seed_kind(&self) -> Option<PerceptionKind> {
        if self.done {
            Some(PerceptionKind::Execution)
        } else if self.observed {
            Some(PerceptionKind::Observation)
        } else {
            None
        }
    }
}

pub fn run<W: Write>(writer: &mut W, args: &AddArgs, config: &Config) -> Result<()> {
    let seed = match args.seed_kind() {
        Some(kind) => Some(Perception::new(kind, resolve_timestamp(args.at.as_deref())?)),
        None if args.at.is_some() => bail!("--at needs --observed or --done"),
        None => None,
    };

    let mut store = Store::open(config, Access::Write)?;
    let mut registry = store.load()?;
    let name = add(&mut registry, &args.name, seed)?;
    store.save(&registry)?;

    writeln!(writer, "Tracking {name}")?;
    Ok(())
}

/// Registers a new item, recording `seed` if given. Returns the stored name.
pub fn add(registry: &mut Registry, name: &str, seed: Option<Perception>) -> Result<String> {
    let item = registry.create(name)?;
    if let Some(seed) = seed {
        item.record(seed)?;
    }
    Ok(item.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            database_path: dir.join("chore.db"),
            default_sort: chore_core::SortKey::default(),
        }
    }

    #[test]
    fn add_creates_item_with_seed() {
        let mut registry = Registry::new();
        let name = add(&mut registry, " water plant ", Some(Perception::execution(100))).unwrap();
        assert_eq!(name, "water plant");
        assert_eq!(registry.get("water plant").unwrap().next_due_date(), 100);
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut registry = Registry::new();
        add(&mut registry, "water plant", None).unwrap();
        let err = add(&mut registry, "water plant", None).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn run_persists_item() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        let args = AddArgs {
            name: "descale kettle".to_string(),
            observed: false,
            done: true,
            at: Some("2026-01-15T10:00:00Z".to_string()),
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Tracking descale kettle\n");

        let registry = Store::open(&config, Access::Read).unwrap().load().unwrap();
        let item = registry.get("descale kettle").unwrap();
        assert_eq!(item.perceptions(), &[Perception::execution(1_768_471_200)]);
    }

    #[test]
    fn run_rejects_at_without_seed() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        let args = AddArgs {
            name: "descale kettle".to_string(),
            observed: false,
            done: false,
            at: Some("1 day ago".to_string()),
        };

        let err = run(&mut Vec::new(), &args, &config).unwrap_err();
        assert!(err.to_string().contains("--at needs"));
    }
}
