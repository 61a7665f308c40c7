//! Configuration module for sassfuse
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SASSFUSE_*)
//! 3. Project config (./sassfuse.toml)
//! 4. User config (~/.config/sassfuse/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{ConfigWarning, PROJECT_CONFIG};
pub use types::{BuildConfig, Config, OutputStyle, WatchConfig};
