/// The set of directories still to expand.
///
/// Directories are remembered by canonical path, so a directory reachable
/// through several routes (nested roots, symlinks, junctions, link cycles)
/// is expanded once per session.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A directory waiting to be listed, tagged with the root it was found
/// under.
#[derive(Debug, Clone)]
pub struct PendingDir {
    pub dir: PathBuf,
    pub root: Arc<Path>,
}

#[derive(Debug, Default)]
pub struct SearchFrontier {
    pending: Vec<PendingDir>,
    visited: HashSet<PathBuf>,
}

impl SearchFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frontier holding every root, each its own provenance root.
    pub fn seeded(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut frontier = Self::new();
        for root in roots {
            let tag: Arc<Path> = Arc::from(root.as_path());
            frontier.push(root, tag);
        }
        frontier
    }

    /// Enqueue `dir` unless it was seen before. Directories whose canonical
    /// form cannot be resolved are dropped.
    pub fn push(&mut self, dir: PathBuf, root: Arc<Path>) -> bool {
        let canonical = match dir.canonicalize() {
            Ok(path) => path,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), %err, "Dropping unresolvable directory");
                return false;
            }
        };
        if !self.visited.insert(canonical) {
            return false;
        }
        self.pending.push(PendingDir { dir, root });
        true
    }

    /// Next directory to expand, in no particular order.
    pub fn pop(&mut self) -> Option<PendingDir> {
        self.pending.pop()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Distinct directories accepted so far, expanded or not.
    pub(crate) fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
