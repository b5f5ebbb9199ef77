/// Scanner module: runs application discovery on a background thread.
///
/// A session walks a set of roots with one dedicated worker thread and
/// streams batches of [`DiscoveredItem`](crate::model::DiscoveredItem)s to a
/// [`BatchSink`]. The caller steers the session through a [`WorkerHandle`]
/// (suspend, resume, cancel) and may either supply its own sink via
/// [`spawn_worker`] or take the channel-backed [`start_discovery`].
pub mod control;
pub mod frontier;
pub mod sink;
pub mod walker;
mod worker;

pub use control::{WorkerControl, WorkerState};
pub use frontier::SearchFrontier;
pub use sink::{BatchSink, ChannelSink, DiscoveryEvent, DiscoverySummary};
pub use walker::{list_directory, DirectoryListing};

use crate::config::{DiscoveryConfig, EVENT_CHANNEL_CAPACITY};
use crossbeam_channel::Receiver;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Handle to a running or finished discovery session.
///
/// Dropping the handle cancels the session without waiting for the thread.
pub struct WorkerHandle {
    control: WorkerControl,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Pause at the next batch boundary.
    pub fn suspend(&self) -> bool {
        self.control.suspend()
    }

    pub fn resume(&self) -> bool {
        self.control.resume()
    }

    /// Stop as soon as possible. Not resumable.
    pub fn cancel(&self) -> bool {
        self.control.cancel()
    }

    pub fn state(&self) -> WorkerState {
        self.control.state()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait until the worker thread exits.
    pub fn join(mut self) -> thread::Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }

    /// Wait up to `timeout` for a terminal state.
    pub fn wait_terminal(&self, timeout: Duration) -> WorkerState {
        self.control.wait_terminal(timeout)
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.control.cancel();
    }
}

/// Start a session that reports to `sink`.
pub fn spawn_worker<S: BatchSink>(
    roots: impl IntoIterator<Item = PathBuf>,
    config: DiscoveryConfig,
    sink: S,
) -> io::Result<WorkerHandle> {
    spawn_controlled(roots, config, WorkerControl::new(), sink)
}

/// Like [`spawn_worker`], but driven by a control the caller created
/// up front. Lets a sink hold the control of its own session.
pub fn spawn_controlled<S: BatchSink>(
    roots: impl IntoIterator<Item = PathBuf>,
    config: DiscoveryConfig,
    control: WorkerControl,
    sink: S,
) -> io::Result<WorkerHandle> {
    let roots: Vec<PathBuf> = roots.into_iter().collect();
    let worker_control = control.clone();

    let thread = thread::Builder::new()
        .name("appscout-discovery".into())
        .spawn(move || worker::run(roots, config, worker_control, sink))?;

    Ok(WorkerHandle {
        control,
        thread: Some(thread),
    })
}

/// A session whose results arrive on a bounded channel.
pub struct DiscoveryHandle {
    /// Batches, then exactly one terminal event.
    pub events_rx: Receiver<DiscoveryEvent>,
    worker: WorkerHandle,
}

impl DiscoveryHandle {
    pub fn suspend(&self) -> bool {
        self.worker.suspend()
    }

    pub fn resume(&self) -> bool {
        self.worker.resume()
    }

    pub fn cancel(&self) -> bool {
        self.worker.cancel()
    }

    pub fn state(&self) -> WorkerState {
        self.worker.state()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker thread. Blocks while the channel is full and
    /// the session is still running, so either drain `events_rx` up to the
    /// terminal event or cancel first.
    pub fn join(self) -> thread::Result<()> {
        self.worker.join()
    }
}

/// Start a session with default settings and a [`ChannelSink`] of
/// [`EVENT_CHANNEL_CAPACITY`].
pub fn start_discovery(roots: impl IntoIterator<Item = PathBuf>) -> io::Result<DiscoveryHandle> {
    let control = WorkerControl::new();
    let (sink, events_rx) = ChannelSink::bounded(EVENT_CHANNEL_CAPACITY, control.clone());
    let worker = spawn_controlled(roots, DiscoveryConfig::default(), control, sink)?;
    Ok(DiscoveryHandle { events_rx, worker })
}
