//! File system watcher for watch mode

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// Watches one dataset file and reports when it has been written
pub struct DatasetWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    file_name: OsString,
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

impl DatasetWatcher {
    /// Start watching `dataset`. The parent directory is watched so that
    /// editors that replace the file on save are still seen.
    pub fn watch(dataset: &Path) -> notify::Result<Self> {
        let file_name = dataset
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| notify::Error::generic("dataset path has no file name"))?;
        let parent = match dataset.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        log::debug!("watching {} for changes", dataset.display());

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_name,
        })
    }

    /// Whether `event` writes the watched dataset
    fn is_dataset_event(&self, event: &notify::Event) -> bool {
        is_create_or_modify(&event.kind)
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
    }

    fn is_relevant(&self, res: notify::Result<notify::Event>) -> bool {
        match res {
            Ok(event) => self.is_dataset_event(&event),
            Err(e) => {
                log::warn!("watch error: {}", e);
                false
            }
        }
    }

    /// Swallow whatever arrives during the debounce window
    fn settle(&self) {
        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(res) = self.receiver.try_recv() {
            self.is_relevant(res);
        }
    }

    /// Block until the dataset changes. Events arriving within the debounce
    /// window, or queued while the caller was busy, count as one change.
    /// Returns `false` once the watcher has shut down.
    pub fn next_change(&self) -> bool {
        loop {
            match self.receiver.recv() {
                Ok(res) => {
                    if self.is_relevant(res) {
                        break;
                    }
                }
                Err(_) => return false,
            }
        }

        self.settle();
        true
    }
}
