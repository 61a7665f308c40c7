//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FuseResult;

use super::loader::{self, ConfigWarning};

/// Output style requested from the compilation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Nested,
    Expanded,
    Compact,
    Compressed,
}

impl OutputStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nested" => Some(Self::Nested),
            "expanded" => Some(Self::Expanded),
            "compact" => Some(Self::Compact),
            "compressed" => Some(Self::Compressed),
            _ => None,
        }
    }
}

/// Settings shared by every build, initial or watch-triggered
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildConfig {
    /// Root that output paths are laid out relative to
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Where compiled CSS goes; stdout when unset
    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    #[serde(default)]
    pub style: OutputStyle,

    /// Ask the backend for source line comments
    #[serde(default)]
    pub comments: bool,
}

/// Watch configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchConfig {
    /// Top-level search paths watched in addition to partial directories
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> FuseResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> FuseResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from project config, user config, or defaults
    pub fn load_or_default(project_root: Option<&Path>) -> (Self, Vec<ConfigWarning>) {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (SASSFUSE_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
