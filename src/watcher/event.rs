//! Watch event types and options

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::build::BuildContext;

/// Callback receiving every [`WatchEvent`] of one watcher instance
pub type Observer = Arc<dyn Fn(WatchEvent) + Send + Sync>;

/// Watch options
#[derive(Clone)]
pub struct WatchOptions {
    /// Search paths watched in addition to partial directories
    pub paths: Vec<PathBuf>,
    /// Shared by every rebuild; its graph decides what gets rebuilt
    pub context: BuildContext,
    pub observer: Option<Observer>,
}

impl WatchOptions {
    pub fn new(context: BuildContext) -> Self {
        Self {
            paths: Vec::new(),
            context,
            observer: None,
        }
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.paths = paths.into_iter().collect();
        self
    }

    pub fn with_observer(mut self, observer: impl Fn(WatchEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        watching: Vec<String>,
    },
    FileChanged {
        path: String,
    },
    RebuildDispatched {
        path: String,
        dependents: Vec<String>,
    },
    RebuildComplete {
        file: String,
        /// Written CSS file; absent when printed to stdout
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    RebuildFailed {
        file: String,
        message: String,
    },
    Error {
        message: String,
    },
    Shutdown,
}

#[derive(Serialize)]
struct Line<'a> {
    command: &'static str,
    #[serde(flatten)]
    event: &'a WatchEvent,
}

impl WatchEvent {
    /// One NDJSON line
    pub fn to_json(&self) -> String {
        let line = Line {
            command: "watch",
            event: self,
        };
        serde_json::to_string(&line).unwrap_or_else(|_| "{}".to_string())
    }
}
