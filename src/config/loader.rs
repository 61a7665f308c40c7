//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FuseError, FuseResult};

use super::types::{Config, OutputStyle};

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG: &str = "sassfuse.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Keys accepted per table; `""` is the top level
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("", &["build", "watch"]),
    ("build", &["dir", "build_dir", "style", "comments"]),
    ("watch", &["paths"]),
];

/// Load configuration and collect a warning per unknown key.
pub fn load_with_warnings(path: &Path) -> FuseResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown: Vec<String> = Vec::new();
    let config: Config =
        serde_ignored::deserialize(toml::de::Deserializer::new(&content), |p| {
            unknown.push(p.to_string());
        })
        .map_err(|e| FuseError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let warnings = unknown
        .iter()
        .map(|dotted| {
            let (table, key) = dotted.rsplit_once('.').unwrap_or(("", dotted.as_str()));
            ConfigWarning {
                key: key.to_string(),
                file: path.to_path_buf(),
                line: key_line(&content, dotted, table, key),
                suggestion: suggest_key(table, key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from project config, user config, or defaults, then apply the
/// environment. A config file that fails to parse is skipped.
pub fn load_or_default(project_root: Option<&Path>) -> (Config, Vec<ConfigWarning>) {
    let mut candidates = Vec::new();
    if let Some(root) = project_root {
        candidates.push(root.join(PROJECT_CONFIG));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("sassfuse/config.toml"));
    }

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match load_with_warnings(&candidate) {
            Ok((config, warnings)) => return (with_env_overrides(config), warnings),
            Err(e) => tracing::warn!("ignoring {}: {}", candidate.display(), e),
        }
    }

    (with_env_overrides(Config::default()), Vec::new())
}

/// Apply environment variable overrides (SASSFUSE_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // SASSFUSE_BUILD_DIR
    if let Ok(dir) = std::env::var("SASSFUSE_BUILD_DIR") {
        if !dir.is_empty() {
            config.build.build_dir = Some(PathBuf::from(dir));
        }
    }

    // SASSFUSE_STYLE
    if let Ok(style) = std::env::var("SASSFUSE_STYLE") {
        match OutputStyle::parse(&style) {
            Some(style) => config.build.style = style,
            None => tracing::warn!("unknown SASSFUSE_STYLE '{}'", style),
        }
    }

    // SASSFUSE_COMMENTS
    if let Ok(val) = std::env::var("SASSFUSE_COMMENTS") {
        config.build.comments = val.to_lowercase() != "false" && val != "0";
    }

    config
}

/// Line of `key = ...` inside `[table]`, or of an unknown `[table]` header
fn key_line(content: &str, dotted: &str, table: &str, key: &str) -> Option<usize> {
    let mut current = "";
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = header.trim();
            if current == dotted {
                return Some(i + 1);
            }
            continue;
        }
        let name = line.split('=').next().unwrap_or_default().trim();
        if current == table && name == key {
            return Some(i + 1);
        }
    }
    None
}

/// Closest known key of the same table, if within two edits
fn suggest_key(table: &str, unknown: &str) -> Option<String> {
    let (_, keys) = KNOWN_KEYS.iter().find(|(t, _)| *t == table)?;
    keys.iter()
        .map(|k| (edit_distance(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 2)
        .min()
        .map(|(_, k)| k.to_string())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1).min(row[j] + 1).min(diag + usize::from(ca != *cb));
            diag = above;
        }
    }
    row[b.len()]
}
