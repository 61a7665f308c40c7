//! sassfuse CLI - flatten Sass imports and rebuild on partial changes
//!
//! Usage: sassfuse <COMMAND>
//!
//! Commands:
//!   build   Build every top-level stylesheet under PATHS
//!   watch   Build once, then rebuild dependents on every change

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { paths, flags } => {
            commands::build::cmd_build(&paths, &flags, cli.config.as_deref(), cli.json)
        }
        Commands::Watch { paths, flags } => {
            commands::watch::cmd_watch(&paths, &flags, cli.config.as_deref(), cli.json)
        }
    }
}

/// Logs go to stderr so stdout stays clean for CSS and NDJSON
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "sassfuse=warn",
        1 => "sassfuse=info",
        2 => "sassfuse=debug",
        _ => "sassfuse=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
