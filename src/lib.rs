//! sassfuse - Sass `@import` flattener and partial-aware rebuild watcher
//!
//! Flattens a stylesheet and every partial it imports into one buffer while
//! remembering where each line came from, so compiler errors point at the
//! original `file:line`. The watcher rebuilds every top-level stylesheet that
//! depends on a partial whenever that partial changes.

pub mod build;
pub mod config;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod resolver;
pub mod watcher;

// Re-exports for convenience
pub use build::{
    build_file, build_paths, Backend, BackendError, BuildContext, BuildOutcome, BuildReport,
    CancelToken, CheckBackend, CompileOptions,
};
pub use config::{BuildConfig, Config, ConfigWarning, OutputStyle};
pub use error::{FuseError, FuseResult};
pub use graph::PartialGraph;
pub use lexer::{Lexer, Token, TokenKind};
pub use resolver::{LineIndex, Location, Resolved, Resolver, PREAMBLE, PREAMBLE_MARKER};
pub use watcher::{RebuildWatcher, WatchEvent, WatchHandle, WatchOptions};
