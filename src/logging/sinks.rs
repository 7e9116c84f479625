use std::{
    collections::VecDeque,
    fs::File,
    io::{LineWriter, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use eyre::Context;

use super::LogSink;

fn open_append(path: &Path) -> eyre::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating log directory {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed opening or creating log file {}", path.display()))
}

/// One-off open, append, close. Used once the owning handle is gone.
pub fn append_once(path: &Path, line: &str) -> eyre::Result<()> {
    let mut file = open_append(path)?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed appending to log file {}", path.display()))
}

struct FileState {
    // None once the sink has been closed by shutdown.
    file: Option<LineWriter<File>>,
    pending: VecDeque<String>,
    // Set while a flush job for this sink sits in the flusher queue.
    flush_scheduled: bool,
}

/// Append-mode file handle with an ordered queue of not yet written lines.
/// Every write, queued or direct, goes through the same lock, so lines land
/// in the file in the order they were handed to the sink.
pub struct FileSink {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileSink {
    pub fn open(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                file: Some(LineWriter::new(file)),
                pending: VecDeque::new(),
                flush_scheduled: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues a line for the background flusher. Returns `true` when no flush
    /// is scheduled yet, meaning the caller has to schedule one. A sink that is
    /// already closed appends the line straight to disk instead.
    pub fn enqueue(&self, line: String) -> eyre::Result<bool> {
        let mut state = self.lock();
        if state.file.is_none() {
            drop(state);
            append_once(&self.path, &line)?;
            return Ok(false);
        }

        state.pending.push_back(line);
        let schedule = !state.flush_scheduled;
        state.flush_scheduled = true;
        Ok(schedule)
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.lock().file.is_none()
    }

    fn drain_locked(&self, state: &mut FileState) -> eyre::Result<()> {
        let FileState { file, pending, .. } = state;
        let Some(file) = file.as_mut() else {
            return Ok(());
        };

        while let Some(line) = pending.front() {
            file.write_all(line.as_bytes())
                .with_context(|| format!("Failed writing to log file {}", self.path.display()))?;
            pending.pop_front();
        }

        file.flush()
            .with_context(|| format!("Can't flush log file {}", self.path.display()))
    }

    /// Writes every queued line.
    pub fn drain(&self) -> eyre::Result<()> {
        let mut state = self.lock();
        self.drain_locked(&mut state)
    }

    /// Runs a scheduled flush. The next queued line schedules a new one even
    /// if this drain fails, so a failing sink keeps reporting errors.
    pub fn run_flush(&self) -> eyre::Result<()> {
        let mut state = self.lock();
        state.flush_scheduled = false;
        self.drain_locked(&mut state)
    }

    /// Drains, flushes and releases the file. Returns `false` if the sink had
    /// already been closed.
    pub fn close(&self) -> eyre::Result<bool> {
        let mut state = self.lock();
        if state.file.is_none() {
            return Ok(false);
        }

        let result = self.drain_locked(&mut state);
        state.file = None;

        // Anything the failed drain left behind goes out through the fallback path.
        let leftover: Vec<String> = state.pending.drain(..).collect();
        drop(state);
        for line in leftover {
            append_once(&self.path, &line)?;
        }

        result.map(|_| true)
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut state = self.lock();
        if state.file.is_none() {
            drop(state);
            return append_once(&self.path, line);
        }

        self.drain_locked(&mut state)?;
        let file = state
            .file
            .as_mut()
            .ok_or_else(|| eyre::eyre!("Log file {} closed mid-write", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed writing to log file {}", self.path.display()))?;
        file.flush().context("Can't flush file")
    }

    fn flush(&self) -> eyre::Result<()> {
        self.drain()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(err) = self.drain() {
            tracing::error!(target: "lumber", "dropping {} with unwritten lines: {:#}", self.path.display(), err);
        }
    }
}

/// Process stdout. Never queued and never closed.
pub struct ConsoleSink {
    handle: std::io::Stdout,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            handle: std::io::stdout(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writer.write_all(line.as_bytes())?;
        writer.flush().context("Can't flush stdout")
    }

    fn flush(&self) -> eyre::Result<()> {
        self.handle.lock().flush().context("Can't flush stdout")
    }
}
