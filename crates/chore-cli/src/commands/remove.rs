//! Remove command: stop tracking a task and drop its history.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use crate::Config;
use crate::store::{Access, Store};

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Name of the task.
    pub name: String,
}

pub fn run<W: Write>(writer: &mut W, args: &RemoveArgs, config: &Config) -> Result<()> {
    let mut store = Store::open(config, Access::Write)?;
    let mut registry = store.load()?;
    let Some(item) = registry.remove(&args.name) else {
        bail!("no item named {:?}", args.name.trim());
    };
    store.save(&registry)?;

    writeln!(
        writer,
        "Stopped tracking {} ({} events dropped)",
        item.name(),
        item.event_count()
    )?;
    Ok(())
}
