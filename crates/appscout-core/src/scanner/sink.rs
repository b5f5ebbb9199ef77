/// Result delivery: the seam between the discovery worker and whoever
/// consumes its batches.
use super::control::WorkerControl;
use crate::config::SEND_RETRY_INTERVAL;
use crate::model::DiscoveredItem;
use crossbeam_channel::{Receiver, SendTimeoutError, Sender};
use serde::Serialize;
use std::time::Duration;

/// Running totals for one session, reported with completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    pub directories_walked: u64,
    /// Directories that could not be read.
    pub directories_skipped: u64,
    /// Target-extension files seen, before filtering.
    pub files_considered: u64,
    pub candidates_accepted: u64,
    pub batches_dispatched: u64,
    pub elapsed: Duration,
}

/// Receives everything a discovery session produces, on the worker thread.
///
/// Implementations must not block for long: the worker waits for each call
/// before touching the filesystem again.
pub trait BatchSink: Send + 'static {
    /// One batch of accepted items from a single directory, possibly empty.
    fn on_batch_ready(&mut self, items: Vec<DiscoveredItem>);

    /// The walk finished without cancellation. Called at most once.
    fn on_completed(&mut self, summary: DiscoverySummary);

    /// The session stopped because it was cancelled. Called at most once.
    fn on_cancelled(&mut self) {}
}

/// Messages sent from the discovery thread by a [`ChannelSink`].
#[derive(Debug)]
pub enum DiscoveryEvent {
    Batch(Vec<DiscoveredItem>),
    Completed(DiscoverySummary),
    Cancelled,
}

impl DiscoveryEvent {
    /// Whether this is the session's last event.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Batch(_))
    }
}

/// Forwards every callback into a bounded crossbeam channel.
///
/// A full channel blocks the worker until the consumer drains it or the
/// session is cancelled, whichever comes first. A dropped receiver
/// cancels the session.
pub struct ChannelSink {
    tx: Sender<DiscoveryEvent>,
    control: WorkerControl,
}

impl ChannelSink {
    /// `control` must be the control of the session this sink serves.
    pub fn new(tx: Sender<DiscoveryEvent>, control: WorkerControl) -> Self {
        Self { tx, control }
    }

    /// A sink plus the receiving end of a fresh bounded channel.
    pub fn bounded(capacity: usize, control: WorkerControl) -> (Self, Receiver<DiscoveryEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx, control), rx)
    }

    fn send(&self, mut event: DiscoveryEvent) {
        loop {
            match self.tx.send_timeout(event, SEND_RETRY_INTERVAL) {
                Ok(()) => return,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if self.control.is_cancelled() {
                        tracing::trace!("Discovery event dropped: session cancelled");
                        return;
                    }
                    event = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    if self.control.cancel() {
                        tracing::debug!("Event receiver dropped; cancelling discovery");
                    }
                    return;
                }
            }
        }
    }
}

impl BatchSink for ChannelSink {
    fn on_batch_ready(&mut self, items: Vec<DiscoveredItem>) {
        self.send(DiscoveryEvent::Batch(items));
    }

    fn on_completed(&mut self, summary: DiscoverySummary) {
        self.send(DiscoveryEvent::Completed(summary));
    }

    fn on_cancelled(&mut self) {
        self.send(DiscoveryEvent::Cancelled);
    }
}
