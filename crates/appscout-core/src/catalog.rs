/// Program catalog, the consumer-side result sink.
///
/// Collects batches from a discovery session, drops items whose path was
/// already received, and answers filtered and sorted views for display.
use crate::model::DiscoveredItem;
use crate::scanner::{DiscoveryEvent, DiscoverySummary};
use crossbeam_channel::Receiver;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Maximum events drained per [`ProgramCatalog::process_events`] call.
///
/// Keeps one drain short even when the worker has queued a large backlog.
pub const MAX_EVENTS_PER_DRAIN: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPhase {
    Discovering,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently accessed first.
    #[default]
    RecentlyUsed,
    NameAscending,
    NameDescending,
}

#[derive(Debug)]
pub struct ProgramCatalog {
    items: Vec<DiscoveredItem>,
    seen: HashSet<PathBuf>,
    phase: CatalogPhase,
    summary: Option<DiscoverySummary>,
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramCatalog {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            phase: CatalogPhase::Discovering,
            summary: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn phase(&self) -> CatalogPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase != CatalogPhase::Discovering
    }

    /// Counters from the completed session, if it completed.
    pub fn summary(&self) -> Option<&DiscoverySummary> {
        self.summary.as_ref()
    }

    /// Items in arrival order.
    pub fn items(&self) -> &[DiscoveredItem] {
        &self.items
    }

    /// Forget everything and expect a new session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Append the items of `batch` not seen before. Returns how many were added.
    pub fn ingest(&mut self, batch: Vec<DiscoveredItem>) -> usize {
        let before = self.items.len();
        for item in batch {
            if self.seen.insert(item.path().to_path_buf()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Drain pending events without blocking, up to [`MAX_EVENTS_PER_DRAIN`].
    ///
    /// Returns `true` if anything changed.
    pub fn process_events(&mut self, events: &Receiver<DiscoveryEvent>) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        while drained < MAX_EVENTS_PER_DRAIN {
            let event = match events.try_recv() {
                Ok(event) => event,
                Err(_) => break,
            };
            drained += 1;
            changed |= self.apply(event);
        }
        changed
    }

    /// Apply one event. Returns `true` if anything changed.
    pub fn apply(&mut self, event: DiscoveryEvent) -> bool {
        match event {
            DiscoveryEvent::Batch(batch) => self.ingest(batch) > 0,
            DiscoveryEvent::Completed(summary) => {
                self.summary = Some(summary);
                self.phase = CatalogPhase::Finished;
                true
            }
            DiscoveryEvent::Cancelled => {
                self.phase = CatalogPhase::Cancelled;
                true
            }
        }
    }

    /// Items matching `query`, ordered by `order`.
    ///
    /// A blank query, or one that is itself a rooted path (the user typing a
    /// manual override), matches everything. Otherwise the path or display
    /// name must contain the query, ignoring case.
    pub fn view(&self, query: &str, order: SortOrder) -> Vec<&DiscoveredItem> {
        let query = query.trim();
        let mut view: Vec<&DiscoveredItem> = if query.is_empty() || is_rooted(query) {
            self.items.iter().collect()
        } else {
            let needle = query.to_lowercase();
            self.items
                .iter()
                .filter(|item| {
                    item.display_name().to_lowercase().contains(&needle)
                        || item.path().to_string_lossy().to_lowercase().contains(&needle)
                })
                .collect()
        };
        view.sort_by(|a, b| compare(a, b, order));
        view
    }
}

/// `/x`, `\x`, and drive-qualified `C:...` all count as rooted.
fn is_rooted(text: &str) -> bool {
    if Path::new(text).has_root() || text.starts_with(['/', '\\']) {
        return true;
    }
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

fn compare(a: &DiscoveredItem, b: &DiscoveredItem, order: SortOrder) -> Ordering {
    let primary = match order {
        SortOrder::RecentlyUsed => b.last_access().cmp(a.last_access()),
        SortOrder::NameAscending => compare_names(a, b),
        SortOrder::NameDescending => compare_names(b, a),
    };
    primary.then_with(|| a.path().cmp(b.path()))
}

fn compare_names(a: &DiscoveredItem, b: &DiscoveredItem) -> Ordering {
    a.display_name()
        .to_lowercase()
        .cmp(&b.display_name().to_lowercase())
}
