//! Recurring task tracker CLI library.
//!
//! This crate provides the CLI interface: configuration, locked storage
//! access, terminal rendering and the subcommands.

mod cli;
pub mod commands;
mod config;
pub mod display;
pub mod store;

pub use cli::{Cli, Commands};
pub use config::Config;
