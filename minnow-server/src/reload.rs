//! Configuration live reload using file watcher

use crate::AppState;
use anyhow::Result;
use minnow_common::MinnowConfig;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Quiet period after the first change event before the file is re-read
const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Reload the configuration whenever its file changes on disk
pub async fn watch_config(state: Arc<AppState>) -> Result<()> {
    if !state.config_path.exists() {
        warn!("Config file does not exist, skipping file watcher");
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel(16);
    let _watcher = config_watcher(&state.config_path, tx)?;
    info!("Watching {} for changes", state.config_path.display());

    while rx.recv().await.is_some() {
        // one save usually fires several events; wait them out and collapse
        tokio::time::sleep(SETTLE_DELAY).await;
        while rx.try_recv().is_ok() {}

        match reload_config(&state).await {
            Ok(()) => info!("Configuration reloaded from {}", state.config_path.display()),
            Err(e) => error!("Failed to reload configuration: {}", e),
        }
    }

    Ok(())
}

/// Watch the config file's directory, signalling on writes to the file itself.
///
/// The directory is watched rather than the file so editors that save by
/// replacing the file are still seen.
fn config_watcher(path: &Path, tx: mpsc::Sender<()>) -> notify::Result<RecommendedWatcher> {
    let file_name = path.file_name().map(OsString::from);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        if touches_config(&event, file_name.as_deref()) {
            // a full channel already holds a pending reload
            let _ = tx.try_send(());
        }
    })?;

    watcher.watch(watch_dir(path), RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn touches_config(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == file_name)
}

fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Reload configuration from file
pub async fn reload_config(state: &Arc<AppState>) -> Result<()> {
    let mut new_config = MinnowConfig::load(&state.config_path)?;
    if let Some(port) = state.port_override {
        new_config.server.port = port;
    }
    new_config.validate()?;

    let mut config = state.config.write().await;
    for field in apply_reload(&mut config, new_config) {
        warn!("Change to server.{} requires a restart; keeping the running value", field);
    }

    Ok(())
}

/// Swap in the reloadable settings, keeping the listener settings in place.
///
/// Returns the names of listener settings that differ in the new file.
fn apply_reload(current: &mut MinnowConfig, new_config: MinnowConfig) -> Vec<&'static str> {
    let mut pending = Vec::new();
    if new_config.server.bind_address != current.server.bind_address {
        pending.push("bind_address");
    }
    if new_config.server.port != current.server.port {
        pending.push("port");
    }
    if new_config.server.max_connections != current.server.max_connections {
        pending.push("max_connections");
    }

    current.server.access_log = new_config.server.access_log;
    current.static_files = new_config.static_files;
    pending
}
