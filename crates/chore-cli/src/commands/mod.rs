//! CLI subcommand implementations.

pub mod add;
pub mod due;
pub mod export;
pub mod import;
pub mod list;
pub mod record;
pub mod remove;
pub mod show;
pub mod status;
pub mod util;
