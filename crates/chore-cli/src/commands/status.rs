//! Status command for showing what is stored.

use std::io::Write;

use anyhow::Result;

use crate::Config;
use crate::store::{Access, Store};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let store = Store::open(config, Access::Read)?;
    let counts = store.counts()?;

    writeln!(writer, "Chore tracker status")?;
    writeln!(writer, "Database: {}", store.path().display())?;

    if counts.items == 0 {
        writeln!(writer, "No tracked items.")?;
        return Ok(());
    }

    writeln!(writer, "Items:    {}", counts.items)?;
    writeln!(writer, "Events:   {}", counts.perceptions)?;
    Ok(())
}
