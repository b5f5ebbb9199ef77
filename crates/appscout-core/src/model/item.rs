//! A single discovered application executable.
//!
//! Items are built once by the metadata extractor and never change
//! afterwards. Ownership moves to the result sink when a batch is
//! dispatched; the discovery worker keeps no copy.
use compact_str::CompactString;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Icon image taken from an executable's resources.
///
/// `ico` is a complete, standalone `.ico` file (header, directory, and
/// image payloads) so any consumer can decode it with an ordinary ICO
/// decoder. `width`/`height` describe the largest image in the set, with
/// 256 for entries whose header stores 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExeIcon {
    pub width: u32,
    pub height: u32,
    pub ico: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredItem {
    /// Absolute path of the executable. Unique key within a catalog.
    path: PathBuf,

    /// Human-readable name followed by the file name in parentheses,
    /// e.g. `"Half-Life 2 (hl2.exe)"`.
    display_name: CompactString,

    /// `None` when the executable carries no usable icon.
    #[serde(skip)]
    icon: Option<ExeIcon>,

    /// Last-access time formatted as `YYYY-MM-DDTHH:MM:SS`, or empty.
    /// The fixed-width format sorts lexicographically in time order.
    last_access: String,
}

impl DiscoveredItem {
    pub fn new(
        path: PathBuf,
        display_name: CompactString,
        icon: Option<ExeIcon>,
        last_access: String,
    ) -> Self {
        Self {
            path,
            display_name,
            icon,
            last_access,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> Option<&ExeIcon> {
        self.icon.as_ref()
    }

    pub fn has_icon(&self) -> bool {
        self.icon.is_some()
    }

    pub fn last_access(&self) -> &str {
        &self.last_access
    }
}
