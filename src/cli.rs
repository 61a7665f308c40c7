use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sassfuse::OutputStyle;

/// sassfuse - flatten Sass imports and rebuild on partial changes
#[derive(Parser, Debug)]
#[command(name = "sassfuse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI (NDJSON)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of sassfuse.toml / user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every top-level stylesheet under PATHS
    Build {
        /// Files or directories (default: [watch] paths from config, else .)
        paths: Vec<PathBuf>,

        #[command(flatten)]
        flags: BuildFlags,
    },

    /// Build once, then rebuild dependents whenever a file changes
    Watch {
        /// Files or directories (default: [watch] paths from config, else .)
        paths: Vec<PathBuf>,

        #[command(flatten)]
        flags: BuildFlags,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildFlags {
    /// Write CSS here instead of stdout
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Output style: nested, expanded, compact, compressed
    #[arg(short, long, value_parser = parse_style)]
    pub style: Option<OutputStyle>,

    /// Ask the compiler for source line comments
    #[arg(long)]
    pub comments: bool,
}

fn parse_style(s: &str) -> Result<OutputStyle, String> {
    OutputStyle::parse(s).ok_or_else(|| {
        format!("unknown style '{s}' (expected nested, expanded, compact or compressed)")
    })
}
