use std::{fmt::Display, sync::Arc};

use eyre::Context;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::{lifecycle::Latch, lifecycle::LifecycleState, sinks::FileSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    Synchronous,
    #[default]
    Asynchronous,
}

impl Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Synchronous => write!(f, "sync"),
            WriteMode::Asynchronous => write!(f, "async"),
        }
    }
}

/// How a single file write is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Buffer on the handle, flushed later by the background worker.
    Queue,
    /// Block until the line (and everything queued before it) is written.
    Direct,
    /// Open, append, close without touching the registry.
    Fallback,
}

/// Draining and Closed always win over the chosen mode.
pub fn dispatch(mode: WriteMode, state: LifecycleState) -> Dispatch {
    match (mode, state) {
        (WriteMode::Asynchronous, LifecycleState::Live) => Dispatch::Queue,
        (WriteMode::Synchronous, LifecycleState::Live) => Dispatch::Direct,
        (_, LifecycleState::Draining) => Dispatch::Direct,
        (_, LifecycleState::Closed) => Dispatch::Fallback,
    }
}

pub enum Job {
    Flush(Arc<FileSink>),
    Close(Arc<FileSink>, Arc<Latch>),
}

impl Job {
    fn run(self) {
        match self {
            Job::Flush(sink) => {
                if let Err(err) = sink.run_flush() {
                    tracing::error!(target: "lumber", "failed flushing {}: {:#}", sink.path().display(), err);
                }
            }
            Job::Close(sink, latch) => {
                match sink.close() {
                    Ok(true) => {
                        tracing::trace!(target: "lumber", "closed {}", sink.path().display())
                    }
                    Ok(false) => {}
                    Err(err) => {
                        tracing::error!(target: "lumber", "failed closing {}: {:#}", sink.path().display(), err)
                    }
                }
                latch.count_down();
            }
        }
    }
}

/// Single background thread that performs queued flushes and closes in the
/// order they were scheduled.
pub struct Flusher {
    sender: UnboundedSender<Job>,
}

impl Flusher {
    pub fn spawn() -> eyre::Result<Self> {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("lumber-flusher".to_string())
            .spawn(move || Self::run(receiver))
            .context("Failed spawning flusher thread")?;

        Ok(Self { sender })
    }

    fn run(mut receiver: UnboundedReceiver<Job>) {
        tracing::debug!(target: "lumber", "starting flusher");
        // NOTE: this runs on a plain thread, never inside a runtime, so blocking_recv is allowed.
        while let Some(job) = receiver.blocking_recv() {
            job.run();
        }
        tracing::debug!(target: "lumber", "flusher stopped");
    }

    /// Hands the job to the worker. If the worker is gone the job runs on the
    /// calling thread so nothing queued is lost.
    pub fn schedule(&self, job: Job) {
        if let Err(err) = self.sender.send(job) {
            tracing::error!(target: "lumber", "flusher unavailable, running job inline");
            err.0.run();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn decision_table() {
        use Dispatch::*;
        use LifecycleState::*;
        use WriteMode::*;

        assert_eq!(dispatch(Asynchronous, Live), Queue);
        assert_eq!(dispatch(Synchronous, Live), Direct);
        assert_eq!(dispatch(Asynchronous, Draining), Direct);
        assert_eq!(dispatch(Synchronous, Draining), Direct);
        assert_eq!(dispatch(Asynchronous, Closed), Fallback);
        assert_eq!(dispatch(Synchronous, Closed), Fallback);
    }

    #[test]
    fn close_job_counts_down_after_flush() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sink = Arc::new(FileSink::open(tmp.path().join("info.log")).unwrap());
        sink.enqueue("pending\n".into()).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let latch = Arc::new(Latch::new(
            1,
            Box::new(move || {
                let _ = tx.send(());
            }),
        ));

        let flusher = Flusher::spawn().unwrap();
        flusher.schedule(Job::Close(Arc::clone(&sink), latch));

        rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert!(sink.is_closed());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("info.log")).unwrap(),
            "pending\n"
        );
    }

    #[test]
    fn flush_jobs_run_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sink = Arc::new(FileSink::open(tmp.path().join("debug.log")).unwrap());
        let flusher = Flusher::spawn().unwrap();

        for i in 0..50 {
            if sink.enqueue(format!("{}\n", i)).unwrap() {
                flusher.schedule(Job::Flush(Arc::clone(&sink)));
            }
        }

        let closed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = std::sync::mpsc::channel();
        let flag = Arc::clone(&closed);
        let latch = Arc::new(Latch::new(
            1,
            Box::new(move || {
                flag.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            }),
        ));
        flusher.schedule(Job::Close(Arc::clone(&sink), latch));
        rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();

        let expected: String = (0..50).map(|i| format!("{}\n", i)).collect();
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("debug.log")).unwrap(),
            expected
        );
    }
}
