//! Notification dispatch: turns file writes into rebuilds of dependents

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::build::{build_file, BuildContext, BuildOutcome};
use crate::error::FuseResult;
use crate::resolver::is_partial;

use super::event::{Observer, WatchEvent, WatchOptions};

/// An idle watcher; nothing is registered until [`RebuildWatcher::start`]
pub struct RebuildWatcher {
    options: WatchOptions,
}

impl RebuildWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self { options }
    }

    /// Register watches and spawn the dispatcher thread. Only failing to
    /// create the platform watcher is fatal.
    pub fn start(self) -> FuseResult<WatchHandle> {
        let (event_tx, event_rx) = unbounded();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            notify::Config::default(),
        )?;

        let mut dispatcher = Dispatcher::new(
            self.options.context.clone(),
            self.options.observer.clone(),
            Some(Box::new(watcher)),
        );
        for path in &self.options.paths {
            let dir = if path.is_file() {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                path.clone()
            };
            dispatcher.watch_dir(&dir);
        }
        dispatcher.refresh_watches();

        let mut watching: Vec<String> = dispatcher
            .watched()
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        watching.sort();
        info!("watching {} directories", watching.len());
        dispatcher.emit(WatchEvent::WatchStarted { watching });

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("sassfuse-watch".to_string())
            .spawn(move || dispatcher.run(event_rx, stop_rx))?;

        Ok(WatchHandle {
            stop: stop_tx,
            thread: Some(thread),
            context: self.options.context,
        })
    }
}

/// Running watcher. Stopping cancels in-flight rebuilds and waits for them.
pub struct WatchHandle {
    stop: Sender<()>,
    thread: Option<JoinHandle<()>>,
    context: BuildContext,
}

impl WatchHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.context.cancel.cancel();
        let _ = self.stop.try_send(());
        if thread.join().is_err() {
            error!("watch dispatcher panicked");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Single consumer of the notification channel
pub(crate) struct Dispatcher {
    context: BuildContext,
    observer: Option<Observer>,
    watcher: Option<Box<dyn Watcher + Send>>,
    watched: HashSet<PathBuf>,
    /// Content hash seen on the previous dispatch of each path
    hashes: HashMap<PathBuf, [u8; 32]>,
    rebuilds: Vec<JoinHandle<()>>,
    /// Changed paths whose dispatch had a failing rebuild
    failed_tx: Sender<PathBuf>,
    failed_rx: Receiver<PathBuf>,
}

impl Dispatcher {
    pub(crate) fn new(
        context: BuildContext,
        observer: Option<Observer>,
        watcher: Option<Box<dyn Watcher + Send>>,
    ) -> Self {
        let (failed_tx, failed_rx) = unbounded();
        Self {
            context,
            observer,
            watcher,
            watched: HashSet::new(),
            hashes: HashMap::new(),
            rebuilds: Vec::new(),
            failed_tx,
            failed_rx,
        }
    }

    pub(crate) fn watched(&self) -> &HashSet<PathBuf> {
        &self.watched
    }

    fn run(mut self, events: Receiver<notify::Result<Event>>, stop: Receiver<()>) {
        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => self.handle(event),
                    Err(_) => {
                        warn!("file watcher disconnected");
                        break;
                    }
                },
                recv(stop) -> _ => break,
            }
        }
        self.finish();
    }

    pub(crate) fn emit(&self, event: WatchEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    /// Register a non-recursive watch on `dir` once. Failures are logged and
    /// skipped.
    pub(crate) fn watch_dir(&mut self, dir: &Path) {
        let dir = match fs::canonicalize(dir) {
            Ok(dir) if dir.is_dir() => dir,
            _ => {
                warn!("not watching missing directory {}", dir.display());
                return;
            }
        };
        if self.watched.contains(&dir) {
            return;
        }
        if let Some(watcher) = self.watcher.as_mut() {
            if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                warn!("failed to watch {}: {}", dir.display(), e);
                self.emit(WatchEvent::Error {
                    message: format!("failed to watch {}: {}", dir.display(), e),
                });
                return;
            }
        }
        debug!("watching {}", dir.display());
        self.watched.insert(dir);
    }

    /// Pick up directories of partials discovered since the last call
    pub(crate) fn refresh_watches(&mut self) {
        let dirs: HashSet<PathBuf> = self
            .context
            .graph
            .subfiles()
            .iter()
            .filter_map(|sub| sub.parent())
            .filter(|dir| dir.is_absolute())
            .map(Path::to_path_buf)
            .collect();
        for dir in dirs {
            if !self.watched.contains(&dir) {
                self.watch_dir(&dir);
            }
        }
    }

    pub(crate) fn handle(&mut self, event: notify::Result<Event>) {
        self.rebuilds.retain(|h| !h.is_finished());

        let event = match event {
            Ok(event) => event,
            Err(e) => {
                error!("watcher error: {:?}", e);
                self.emit(WatchEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };
        if !is_write(&event.kind) {
            return;
        }
        for path in event.paths {
            self.dispatch(&path);
        }
    }

    fn dispatch(&mut self, path: &Path) {
        let path = match fs::canonicalize(path) {
            Ok(path) => path,
            Err(e) => {
                debug!("ignoring {}: {}", path.display(), e);
                return;
            }
        };
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("ignoring {}: {}", path.display(), e);
                return;
            }
        };
        // A failed rebuild may be fixed by another file, so the same content
        // must be allowed through again.
        for failed in self.failed_rx.try_iter() {
            self.hashes.remove(&failed);
        }
        let hash: [u8; 32] = Sha256::digest(&content).into();
        if self.hashes.get(&path) == Some(&hash) {
            debug!("content of {} unchanged", path.display());
            return;
        }
        self.hashes.insert(path.clone(), hash);
        self.emit(WatchEvent::FileChanged {
            path: path.display().to_string(),
        });

        self.refresh_watches();
        let mut dependents = self.context.graph.lookup(&path);
        if dependents.is_empty() {
            if is_partial(&path) || !path.extension().is_some_and(|e| e == "scss") {
                debug!("no dependents for {}", path.display());
                return;
            }
            dependents.push(path.clone());
        }

        self.emit(WatchEvent::RebuildDispatched {
            path: path.display().to_string(),
            dependents: dependents.iter().map(|d| d.display().to_string()).collect(),
        });
        for file in dependents {
            self.spawn_rebuild(&path, file);
        }
    }

    fn spawn_rebuild(&mut self, changed: &Path, file: PathBuf) {
        let context = self.context.clone();
        let observer = self.observer.clone();
        let failed_tx = self.failed_tx.clone();
        let changed = changed.to_path_buf();
        let spawned = thread::Builder::new()
            .name("sassfuse-rebuild".to_string())
            .spawn(move || {
                let event = match build_file(&file, &context) {
                    Ok(outcome) => WatchEvent::RebuildComplete {
                        file: file.display().to_string(),
                        output: match outcome {
                            BuildOutcome::Written(dest) => Some(dest.display().to_string()),
                            BuildOutcome::Printed | BuildOutcome::Skipped => None,
                        },
                    },
                    Err(e) => {
                        error!("rebuild of {} failed: {}", file.display(), e);
                        let _ = failed_tx.send(changed);
                        WatchEvent::RebuildFailed {
                            file: file.display().to_string(),
                            message: e.to_string(),
                        }
                    }
                };
                if let Some(observer) = observer {
                    observer(event);
                }
            });
        match spawned {
            Ok(handle) => self.rebuilds.push(handle),
            Err(e) => {
                error!("failed to spawn rebuild: {}", e);
                self.emit(WatchEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Wait for every in-flight rebuild
    pub(crate) fn join_rebuilds(&mut self) {
        for handle in self.rebuilds.drain(..) {
            if handle.join().is_err() {
                error!("rebuild thread panicked");
            }
        }
    }

    fn finish(mut self) {
        self.join_rebuilds();
        self.emit(WatchEvent::Shutdown);
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
