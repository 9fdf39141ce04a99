use std::io::{self, Write};

use anyhow::{Context, Result};
use chore_core::PerceptionKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chore_cli::commands::{add, due, export, import, list, record, remove, show, status};
use chore_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Add(args) => add::run(&mut out, args, &config)?,
        Commands::Observe(args) => {
            record::run(&mut out, args, PerceptionKind::Observation, &config)?;
        }
        Commands::Done(args) => record::run(&mut out, args, PerceptionKind::Execution, &config)?,
        Commands::List(args) => list::run(&mut out, args, &config)?,
        Commands::Show(args) => show::run(&mut out, args, &config)?,
        Commands::Due(args) => due::run(&mut out, args, &config)?,
        Commands::Remove(args) => remove::run(&mut out, args, &config)?,
        Commands::Export => {
            let written = export::run(&mut out, &config)?;
            tracing::debug!(written, "items exported");
        }
        Commands::Import(args) => {
            let stdin = io::stdin();
            let summary = import::run(stdin.lock(), &mut out, args, &config)?;
            tracing::debug!(?summary, "items imported");
        }
        Commands::Status => status::run(&mut out, &config)?,
    }

    out.flush()?;
    Ok(())
}
