//! Error types for sassfuse
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sassfuse operations
pub type FuseResult<T> = Result<T, FuseError>;

/// Main error type for sassfuse operations
#[derive(Error, Debug)]
pub enum FuseError {
    /// Tokenizer rejected the input
    #[error("{message} in {file}:{line} (pos {offset})")]
    Lexical {
        file: PathBuf,
        offset: usize,
        line: usize,
        message: String,
    },

    /// `@import` not followed by a name
    #[error("@import in {file}:{line} must be followed by a file name")]
    InvalidImport {
        file: PathBuf,
        offset: usize,
        line: usize,
    },

    /// Import target missing or unreadable
    #[error("could not import {path}: {source}")]
    ImportUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A partial (transitively) imports itself
    #[error("import cycle: {}", format_chain(.chain))]
    ImportCycle { chain: Vec<PathBuf> },

    /// Compilation backend failed; `location` is already translated to `file:line`
    #[error("{location}: {message}")]
    Compile { location: String, message: String },

    /// Filesystem watcher could not be created
    #[error("watch setup failed: {0}")]
    WatchSetup(#[from] notify::Error),

    /// Build was cancelled before it finished
    #[error("build of {file} cancelled")]
    Cancelled { file: PathBuf },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
