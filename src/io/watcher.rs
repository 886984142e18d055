use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the config watcher to the demo loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// The config file was written or replaced.
    Changed(PathBuf),
    /// The config file was removed.
    Removed(PathBuf),
}

/// Watches a single config file for edits.
///
/// Editors often save by writing a temp file and renaming it over the
/// original, so the parent directory is watched and events are filtered by
/// file name.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<ConfigEvent>,
}

impl ConfigWatcher {
    /// Start watching `config_path`.
    /// Returns a `ConfigWatcher` whose `poll()` method should be called each tick.
    pub fn start(config_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = config_path.to_path_buf();
        let dir = match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                if !event.paths.iter().any(|p| p.file_name() == target.file_name()) {
                    return;
                }
                let sent = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => {
                        ConfigEvent::Changed(target.clone())
                    }
                    EventKind::Remove(_) => ConfigEvent::Removed(target.clone()),
                    _ => return,
                };
                let _ = tx.send(sent);
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(ConfigWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events.
    /// Bursts collapse to the most recent event (may be `None`).
    pub fn poll(&self) -> Option<ConfigEvent> {
        let mut last = None;
        while let Ok(evt) = self.rx.try_recv() {
            last = Some(evt);
        }
        last
    }
}
