use crate::config::has_extension;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Direct contents of one directory that matter to discovery.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    /// Files with the target extension, in listing order.
    pub files: Vec<PathBuf>,
    /// Child directories, symlinked ones included.
    pub subdirs: Vec<PathBuf>,
}

/// List `dir` one level deep.
///
/// Returns `None` when the directory itself cannot be read (permissions,
/// vanished, not a directory). Entries that fail individually are skipped.
pub fn list_directory(dir: &Path, extension: &str) -> Option<DirectoryListing> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "Skipping unreadable directory");
            return None;
        }
    };

    let mut listing = DirectoryListing::default();
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        // Links are followed; the frontier's visited set stops cycles.
        let is_dir = if file_type.is_symlink() {
            path.is_dir()
        } else {
            file_type.is_dir()
        };

        if is_dir {
            listing.subdirs.push(path);
        } else if has_extension(&path, extension) {
            listing.files.push(path);
        }
    }
    Some(listing)
}
