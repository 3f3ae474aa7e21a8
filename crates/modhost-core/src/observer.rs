//! Load event observers.
//!
//! The loader never returns an error for individual modules, so outcomes are
//! surfaced twice: in the returned [`LoadReport`](crate::LoadReport) and as
//! events delivered to every registered [`LoadObserver`]. [`TracingObserver`]
//! is always registered and writes the diagnostic lines.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Receives loader events in the order they happen.
pub trait LoadObserver: Send + Sync {
    /// A search directory was registered, or `None` when none could be.
    fn search_directory(&self, _dir: Option<&Path>) {}

    /// A load of `file_name` is about to be attempted.
    fn attempt(&self, file_name: &str);

    /// `file_name` was loaded.
    fn loaded(&self, _file_name: &str) {}

    /// `file_name` could not be loaded.
    fn failed(&self, file_name: &str, reason: &str);
}

/// Writes loader events as `tracing` diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn search_directory(&self, dir: Option<&Path>) {
        match dir {
            Some(dir) => tracing::debug!("module search directory: {}", dir.display()),
            None => tracing::debug!("no module search directory registered"),
        }
    }

    fn attempt(&self, file_name: &str) {
        tracing::info!("loading `{}` ...", file_name);
    }

    fn loaded(&self, file_name: &str) {
        tracing::debug!("loaded `{}`", file_name);
    }

    fn failed(&self, file_name: &str, reason: &str) {
        tracing::warn!(reason = %reason, "failed to load library `{}`", file_name);
    }
}

/// A recorded loader event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    SearchDirectory(Option<PathBuf>),
    Attempt(String),
    Loaded(String),
    Failed { file_name: String, reason: String },
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LoadEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<LoadEvent> {
        self.events.lock().clone()
    }

    /// File names passed to [`LoadObserver::attempt`], in order.
    pub fn attempts(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LoadEvent::Attempt(file_name) => Some(file_name.clone()),
                _ => None,
            })
            .collect()
    }

    /// File names passed to [`LoadObserver::failed`], in order.
    pub fn failures(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LoadEvent::Failed { file_name, .. } => Some(file_name.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: LoadEvent) {
        self.events.lock().push(event);
    }
}

impl LoadObserver for RecordingObserver {
    fn search_directory(&self, dir: Option<&Path>) {
        self.push(LoadEvent::SearchDirectory(dir.map(Path::to_path_buf)));
    }

    fn attempt(&self, file_name: &str) {
        self.push(LoadEvent::Attempt(file_name.to_string()));
    }

    fn loaded(&self, file_name: &str) {
        self.push(LoadEvent::Loaded(file_name.to_string()));
    }

    fn failed(&self, file_name: &str, reason: &str) {
        self.push(LoadEvent::Failed {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.attempt("liba.so");
        observer.loaded("liba.so");
        observer.attempt("libb.so");
        observer.failed("libb.so", "not found");

        assert_eq!(observer.attempts(), ["liba.so", "libb.so"]);
        assert_eq!(observer.failures(), ["libb.so"]);
        assert_eq!(observer.events().len(), 4);
    }
}
