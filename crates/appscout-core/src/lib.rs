/// AppScout Core: application discovery, filtering, and metadata.
///
/// This crate contains all discovery logic with zero UI dependencies.
/// Frontends receive results through the [`scanner::BatchSink`] seam and
/// keep them in a [`catalog::ProgramCatalog`].
///
/// # Modules
///
/// - [`locator`]: Best-effort provenance probes that yield install roots.
/// - [`scanner`]: Background discovery worker with suspend/resume/cancel.
/// - [`filter`]: Heuristic predicate rejecting non-application executables.
/// - [`metadata`]: Display name, icon, and last-access extraction.
/// - [`catalog`]: Deduplicating result sink with search and sorting.
/// - [`selection`]: Validation of a manually chosen executable path.
/// - [`platform`]: Known folders and Windows registry access.
pub mod catalog;
pub mod config;
pub mod filter;
pub mod locator;
pub mod metadata;
pub mod model;
pub mod platform;
pub mod scanner;
pub mod selection;

pub use config::DiscoveryConfig;
pub use model::{DiscoveredItem, ExeIcon};
