//! Rebuild watcher
//!
//! Watches the directories of every known partial plus the configured search
//! paths (non-recursively). A write to a file rebuilds every top-level file
//! that depends on it, each on its own thread:
//! - Content-hash filtering of editor save noise
//! - Watch set grows as rebuilds discover new partials
//! - Failures are isolated per rebuild and reported to the observer
//! - Stopping cancels and joins in-flight rebuilds

mod dispatch;
mod event;

pub use dispatch::{RebuildWatcher, WatchHandle};
pub use event::{Observer, WatchEvent, WatchOptions};
