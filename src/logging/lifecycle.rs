use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

pub type Callback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Live,
    Draining,
    Closed,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Live => write!(f, "Live"),
            LifecycleState::Draining => write!(f, "Draining"),
            LifecycleState::Closed => write!(f, "Closed"),
        }
    }
}

struct Inner {
    state: LifecycleState,
    waiters: Vec<Callback>,
}

/// Live -> Draining -> Closed. Closed is terminal.
pub struct Lifecycle {
    inner: Mutex<Inner>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: LifecycleState::Live,
                waiters: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// Registers `on_complete` and returns `true` only for the call that moved
    /// the state from Live to Draining. If already Closed the callback runs
    /// right away.
    pub fn begin_shutdown(&self, on_complete: Callback) -> bool {
        let mut inner = self.lock();
        match inner.state {
            LifecycleState::Live => {
                inner.state = LifecycleState::Draining;
                inner.waiters.push(on_complete);
                true
            }
            LifecycleState::Draining => {
                inner.waiters.push(on_complete);
                false
            }
            LifecycleState::Closed => {
                drop(inner);
                on_complete();
                false
            }
        }
    }

    /// Moves to Closed and runs every waiter, outside the lock.
    pub fn finish(&self) {
        let waiters = {
            let mut inner = self.lock();
            inner.state = LifecycleState::Closed;
            std::mem::take(&mut inner.waiters)
        };

        tracing::debug!(target: "lumber", "lifecycle closed, notifying {} waiter(s)", waiters.len());
        for waiter in waiters {
            waiter();
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Counting join: runs its callback once `count` completions were reported.
pub struct Latch {
    remaining: AtomicUsize,
    on_zero: Mutex<Option<Callback>>,
}

impl Latch {
    pub fn new(count: usize, on_zero: Callback) -> Self {
        let latch = Self {
            remaining: AtomicUsize::new(count),
            on_zero: Mutex::new(Some(on_zero)),
        };

        if count == 0 {
            latch.fire();
        }

        latch
    }

    pub fn count_down(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        if previous == Ok(1) {
            self.fire();
        }
    }

    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    fn fire(&self) {
        let callback = self
            .on_zero
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(callback) = callback {
            callback();
        }
    }
}
