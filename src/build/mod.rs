//! Build orchestration
//!
//! Resolves one top-level file, hands the flattened buffer to the
//! compilation backend and writes the result. Backend errors are translated
//! from flattened coordinates back to the original `file:line`.
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = BuildContext::new(config, graph, Arc::new(CheckBackend));
//! match build_file(Path::new("sass/site.scss"), &ctx)? {
//!     BuildOutcome::Written(css) => println!("wrote {}", css.display()),
//!     _ => {}
//! }
//! ```

mod backend;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::{FuseError, FuseResult};
use crate::graph::PartialGraph;
use crate::resolver::{is_partial, Resolver};

pub use backend::{Backend, BackendError, CheckBackend, CompileOptions};
pub use output::{output_path, OutputSink};

/// Cooperative cancellation flag shared by in-flight builds
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a build needs besides the file itself. Cheap to clone; shared
/// by the initial build and every watch-triggered rebuild.
#[derive(Clone)]
pub struct BuildContext {
    pub config: Arc<BuildConfig>,
    pub graph: Arc<PartialGraph>,
    pub backend: Arc<dyn Backend>,
    pub cancel: CancelToken,
}

impl BuildContext {
    pub fn new(config: BuildConfig, graph: Arc<PartialGraph>, backend: Arc<dyn Backend>) -> Self {
        Self {
            config: Arc::new(config),
            graph,
            backend,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn checkpoint(&self, file: &Path) -> FuseResult<()> {
        if self.cancel.is_cancelled() {
            return Err(FuseError::Cancelled {
                file: file.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// What a build did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Partials are never built directly
    Skipped,
    Written(PathBuf),
    Printed,
}

/// Resolve, compile and write one top-level file
pub fn build_file(file: &Path, ctx: &BuildContext) -> FuseResult<BuildOutcome> {
    if is_partial(file) {
        debug!("skipping partial {}", file.display());
        return Ok(BuildOutcome::Skipped);
    }
    ctx.checkpoint(file)?;

    let file = fs::canonicalize(file)?;
    let input = fs::read_to_string(&file)?;
    let sink = OutputSink::create(output_path(&file, &ctx.config))?;

    let dir = file.parent().unwrap_or(Path::new("."));
    let resolved = Resolver::new(&file)
        .with_graph(&ctx.graph)
        .resolve(&input, dir)?;
    ctx.checkpoint(&file)?;

    let options = CompileOptions::from(&*ctx.config);
    let css = ctx
        .backend
        .compile(&resolved.buffer(), &options)
        .map_err(|e| FuseError::Compile {
            location: resolved.lookup_file(e.line),
            message: e.message,
        })?;
    ctx.checkpoint(&file)?;

    match sink.commit(&css)? {
        Some(dest) => {
            info!("{} -> {}", file.display(), dest.display());
            Ok(BuildOutcome::Written(dest))
        }
        None => Ok(BuildOutcome::Printed),
    }
}

/// Result of building one file found by [`build_paths`]
#[derive(Debug)]
pub struct BuildReport {
    pub file: PathBuf,
    pub result: FuseResult<BuildOutcome>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every top-level `.scss` file under `paths` (files are taken as given),
/// honoring ignore files, sorted
pub fn collect_sources(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_file() {
            sources.push(path.clone());
            continue;
        }
        let entries = WalkBuilder::new(path).build().filter_map(Result::ok);
        for entry in entries {
            let candidate = entry.path();
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if is_file
                && candidate.extension().is_some_and(|e| e == "scss")
                && !is_partial(candidate)
            {
                sources.push(candidate.to_path_buf());
            }
        }
    }
    sources.sort();
    sources.dedup();
    sources
}

/// Build every top-level file under `paths`. Failures are per file; one bad
/// file never stops the others.
pub fn build_paths(paths: &[PathBuf], ctx: &BuildContext) -> Vec<BuildReport> {
    collect_sources(paths)
        .into_iter()
        .map(|file| {
            let result = build_file(&file, ctx);
            BuildReport { file, result }
        })
        .collect()
}
