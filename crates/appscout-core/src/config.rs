//! Build-time discovery settings.
//!
//! None of these are runtime-configurable from the outside; the
//! [`DiscoveryConfig`] value only exists so the worker reads them from one
//! place instead of reaching for globals.
use std::time::Duration;

/// Executable extension the walker and filter look for (no leading dot).
pub const TARGET_EXTENSION: &str = "exe";

/// Number of files handled between two suspend/cancel checkpoints.
///
/// Smaller batches make the list fill in more smoothly; larger ones cut the
/// per-dispatch overhead on the consumer side.
pub const BATCH_SIZE: usize = 50;

/// Pause after every dispatched batch so the consumer thread gets a turn.
pub const IDLE_YIELD: Duration = Duration::from_millis(5);

/// Capacity of the bounded event channel used by [`crate::scanner::start_discovery`].
///
/// A consumer that stops draining makes the worker block on `send` instead
/// of growing the queue without limit.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// How long a [`crate::scanner::ChannelSink`] waits on a full channel
/// before checking for cancellation again.
pub const SEND_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for one discovery session.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Target executable extension, compared case-insensitively.
    pub extension: &'static str,
    /// Files per batch.
    pub batch_size: usize,
    /// Sleep after each dispatch.
    pub idle_yield: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: TARGET_EXTENSION,
            batch_size: BATCH_SIZE,
            idle_yield: IDLE_YIELD,
        }
    }
}

/// Returns `true` when `path` has `extension` (case-insensitive).
pub fn has_extension(path: &std::path::Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

const _: () = assert!(BATCH_SIZE > 0, "BATCH_SIZE must be > 0");
const _: () = assert!(EVENT_CHANNEL_CAPACITY > 0, "EVENT_CHANNEL_CAPACITY must be > 0");
