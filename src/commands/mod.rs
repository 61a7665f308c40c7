//! Subcommand implementations and the setup they share

pub mod build;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use sassfuse::{BuildConfig, BuildContext, CheckBackend, Config, ConfigWarning, PartialGraph};

use crate::cli::BuildFlags;

/// Resolve the effective configuration. The first of `--config`, project
/// config and user config supplies the file layer; environment and CLI flags
/// override it.
pub fn load_config(explicit: Option<&Path>, flags: &BuildFlags) -> Result<Config> {
    let (config, warnings) = match explicit {
        Some(path) => Config::load_with_warnings(path)?,
        None => {
            let cwd = std::env::current_dir()?;
            Config::load_or_default(Some(&cwd))
        }
    };
    print_config_warnings(&warnings);

    let mut config = config.with_env_overrides();
    apply_flags(&mut config.build, flags);
    Ok(config)
}

fn apply_flags(build: &mut BuildConfig, flags: &BuildFlags) {
    if let Some(dir) = &flags.build_dir {
        build.build_dir = Some(dir.clone());
    }
    if let Some(style) = flags.style {
        build.style = style;
    }
    if flags.comments {
        build.comments = true;
    }
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        let location = match w.line {
            Some(line) => format!("{}:{}", w.file.display(), line),
            None => w.file.display().to_string(),
        };
        match &w.suggestion {
            Some(s) => eprintln!("warning: unknown config key '{}' in {} (did you mean '{}'?)", w.key, location, s),
            None => eprintln!("warning: unknown config key '{}' in {}", w.key, location),
        }
    }
}

/// CLI paths, else `[watch] paths`, else the current directory
pub fn search_paths(paths: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    if !paths.is_empty() {
        return paths.to_vec();
    }
    if !config.watch.paths.is_empty() {
        return config.watch.paths.clone();
    }
    vec![PathBuf::from(".")]
}

/// Build context with a fresh graph and the shipped structural backend.
/// Without an explicit `dir`, output paths are laid out relative to the first
/// search path that is a directory.
pub fn build_context(mut config: BuildConfig, paths: &[PathBuf]) -> BuildContext {
    if config.dir.is_none() {
        config.dir = paths.iter().find(|p| p.is_dir()).cloned();
    }
    BuildContext::new(config, Arc::new(PartialGraph::new()), Arc::new(CheckBackend))
}
