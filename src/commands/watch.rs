use std::path::{Path, PathBuf};

use anyhow::Result;
use sassfuse::{build_paths, RebuildWatcher, WatchEvent, WatchOptions};

use crate::cli::BuildFlags;

pub fn cmd_watch(paths: &[PathBuf], flags: &BuildFlags, config: Option<&Path>, json: bool) -> Result<()> {
    let config = super::load_config(config, flags)?;
    let paths = super::search_paths(paths, &config);
    let ctx = super::build_context(config.build, &paths);

    // Initial build seeds the partial graph
    let reports = build_paths(&paths, &ctx);
    super::build::report(&reports, "watch", json);

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    let cancel = ctx.cancel.clone();
    ctrlc::set_handler(move || {
        cancel.cancel();
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    if !json {
        eprintln!("Press Ctrl+C to stop\n");
    }

    let options = WatchOptions::new(ctx)
        .with_paths(paths)
        .with_observer(move |event| print_event(&event, json));
    let handle = RebuildWatcher::new(options).start()?;

    let _ = stop_rx.recv();
    handle.stop();
    Ok(())
}

fn print_event(event: &WatchEvent, json: bool) {
    if json {
        println!("{}", event.to_json());
        return;
    }

    let timestamp = chrono::Local::now().format("%H:%M:%S");
    match event {
        WatchEvent::WatchStarted { watching } => {
            for dir in watching {
                println!("[{timestamp}] watching {dir}");
            }
        }
        WatchEvent::FileChanged { path } => println!("[{timestamp}] changed {path}"),
        WatchEvent::RebuildDispatched { dependents, .. } => {
            println!("[{timestamp}] rebuilding {} file(s)", dependents.len());
        }
        WatchEvent::RebuildComplete { file, output } => match output {
            Some(output) => println!("[{timestamp}] ✓ {file} -> {output}"),
            None => println!("[{timestamp}] ✓ {file}"),
        },
        WatchEvent::RebuildFailed { message, .. } => eprintln!("[{timestamp}] ✗ {message}"),
        WatchEvent::Error { message } => eprintln!("[{timestamp}] ✗ error: {message}"),
        WatchEvent::Shutdown => println!("[{timestamp}] shutting down"),
    }
}
