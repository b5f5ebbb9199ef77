/// Data model for discovered applications.
///
/// Re-exports the item type handed to result sinks and its icon payload.
pub mod item;

pub use item::{DiscoveredItem, ExeIcon};
