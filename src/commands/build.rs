use std::path::{Path, PathBuf};

use anyhow::Result;
use sassfuse::{build_paths, BuildOutcome, BuildReport};

use crate::cli::BuildFlags;

pub fn cmd_build(paths: &[PathBuf], flags: &BuildFlags, config: Option<&Path>, json: bool) -> Result<()> {
    let config = super::load_config(config, flags)?;
    let paths = super::search_paths(paths, &config);
    let ctx = super::build_context(config.build, &paths);

    let reports = build_paths(&paths, &ctx);
    let failed = report(&reports, "build", json);

    if reports.is_empty() && !json {
        eprintln!("no stylesheets found");
    }
    if failed > 0 {
        anyhow::bail!("{} of {} builds failed", failed, reports.len());
    }
    Ok(())
}

/// Print one line per build; returns how many failed
pub(crate) fn report(reports: &[BuildReport], command: &str, json: bool) -> usize {
    let mut failed = 0;
    for r in reports {
        let file = r.file.display().to_string();
        if r.result.is_err() {
            failed += 1;
        }
        if json {
            let line = match &r.result {
                Ok(BuildOutcome::Written(dest)) => serde_json::json!({
                    "command": command, "event": "built", "file": file, "output": dest.display().to_string(),
                }),
                Ok(BuildOutcome::Printed) => serde_json::json!({
                    "command": command, "event": "built", "file": file,
                }),
                Ok(BuildOutcome::Skipped) => serde_json::json!({
                    "command": command, "event": "skipped", "file": file,
                }),
                Err(e) => serde_json::json!({
                    "command": command, "event": "failed", "file": file, "message": e.to_string(),
                }),
            };
            println!("{line}");
        } else {
            match &r.result {
                Ok(BuildOutcome::Written(dest)) => eprintln!("✓ {} -> {}", file, dest.display()),
                Ok(BuildOutcome::Printed) => eprintln!("✓ {}", file),
                Ok(BuildOutcome::Skipped) => {}
                Err(e) => eprintln!("✗ {}", e),
            }
        }
    }
    failed
}
