use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use super::sinks::FileSink;

#[derive(Default)]
struct RegistryState {
    sinks: HashMap<PathBuf, Arc<FileSink>>,
    sealed: bool,
    opened: usize,
}

/// Owns every file handle, keyed by resolved path. A path is opened at most
/// once: the map lock is held across the open so concurrent first writes to
/// the same target can't race each other into two handles.
#[derive(Default)]
pub struct SinkRegistry {
    state: Mutex<RegistryState>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the handle for `path`, opening it on first use. Once sealed,
    /// existing handles are still handed out but no new file is opened and
    /// `None` is returned instead.
    pub fn acquire(&self, path: &Path) -> eyre::Result<Option<Arc<FileSink>>> {
        let mut state = self.lock();
        if let Some(sink) = state.sinks.get(path) {
            return Ok(Some(Arc::clone(sink)));
        }

        if state.sealed {
            return Ok(None);
        }

        let sink = Arc::new(FileSink::open(path)?);
        state.sinks.insert(path.to_path_buf(), Arc::clone(&sink));
        state.opened += 1;
        tracing::debug!(target: "lumber", "opened sink {}", path.display());

        Ok(Some(sink))
    }

    /// Stops new handles from being created and returns every handle opened so far.
    pub fn seal(&self) -> Vec<Arc<FileSink>> {
        let mut state = self.lock();
        state.sealed = true;
        state.sinks.values().cloned().collect()
    }

    pub fn sinks(&self) -> Vec<Arc<FileSink>> {
        self.lock().sinks.values().cloned().collect()
    }

    /// Number of files ever opened by this registry.
    pub fn opened(&self) -> usize {
        self.lock().opened
    }
}
