/// Worker lifecycle state machine.
///
/// One mutex-guarded [`WorkerState`] plus a condvar, shared between the
/// worker thread and every handle. The worker only observes the state at
/// its checkpoints (batch boundaries), so a request is honoured at the next
/// boundary rather than immediately.
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// Where a discovery session is in its lifecycle.
///
/// `Running` and `Suspended` alternate while the worker is active.
/// `Cancelled` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Suspended,
    Cancelled,
    Completed,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

struct Shared {
    state: Mutex<WorkerState>,
    changed: Condvar,
}

/// Cloneable control handle for one session.
#[derive(Clone)]
pub struct WorkerControl {
    shared: Arc<Shared>,
}

impl Default for WorkerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkerControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WorkerControl").field(&self.state()).finish()
    }
}

impl WorkerControl {
    /// A fresh control in the `Running` state.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(WorkerState::Running),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == WorkerState::Cancelled
    }

    /// Running → Suspended. Returns whether the transition happened.
    pub fn suspend(&self) -> bool {
        self.transition(WorkerState::Running, WorkerState::Suspended)
    }

    /// Suspended → Running, waking the worker.
    pub fn resume(&self) -> bool {
        self.transition(WorkerState::Suspended, WorkerState::Running)
    }

    /// Running/Suspended → Cancelled. Terminal; wakes a suspended worker.
    pub fn cancel(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.is_terminal() {
            return false;
        }
        *state = WorkerState::Cancelled;
        self.shared.changed.notify_all();
        true
    }

    fn transition(&self, from: WorkerState, to: WorkerState) -> bool {
        let mut state = self.shared.state.lock();
        if *state != from {
            return false;
        }
        *state = to;
        self.shared.changed.notify_all();
        true
    }

    /// Block while suspended. Returns `false` once the session is cancelled.
    pub(crate) fn checkpoint(&self) -> bool {
        let mut state = self.shared.state.lock();
        while *state == WorkerState::Suspended {
            self.shared.changed.wait(&mut state);
        }
        *state == WorkerState::Running
    }

    /// Running → Completed, waiting out a pending suspension first.
    /// Returns `false` when the session was cancelled instead.
    pub(crate) fn complete(&self) -> bool {
        let mut state = self.shared.state.lock();
        while *state == WorkerState::Suspended {
            self.shared.changed.wait(&mut state);
        }
        if *state != WorkerState::Running {
            return false;
        }
        *state = WorkerState::Completed;
        self.shared.changed.notify_all();
        true
    }

    /// Wait until the session reaches a terminal state or `timeout` elapses.
    /// Returns the state observed last.
    pub fn wait_terminal(&self, timeout: Duration) -> WorkerState {
        let mut state = self.shared.state.lock();
        if !state.is_terminal() {
            self.shared
                .changed
                .wait_while_for(&mut state, |s| !s.is_terminal(), timeout);
        }
        *state
    }
}
