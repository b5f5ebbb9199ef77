/// Source locator: finds directories worth searching for applications.
///
/// Each provenance signal (a launcher's install registry entry, its library
/// manifest, a well-known vendor folder) is an independent [`RootProbe`].
/// Probes never fail the locator: an error inside one probe is logged and
/// that probe contributes nothing. Adding or removing a probe does not
/// touch the orchestration below.
pub mod epic;
pub mod gog;
pub mod origin;
pub mod steam;

pub use epic::EpicProbe;
pub use gog::GogProbe;
pub use origin::OriginProbe;
pub use steam::SteamProbe;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Why a probe contributed nothing. Never surfaced beyond a debug log.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0} is not installed")]
    NotInstalled(&'static str),

    #[error("not supported on this platform")]
    Unsupported,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {0}")]
    Malformed(&'static str),
}

/// A best-effort source of install-root directories.
pub trait RootProbe: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Produce roots, or say why there are none.
    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError>;

    /// Roots from [`probe`](Self::probe) with every error swallowed.
    fn discover_roots(&self) -> HashSet<PathBuf> {
        match self.probe() {
            Ok(roots) => {
                debug!(probe = self.name(), count = roots.len(), "Probe contributed roots");
                roots.into_iter().collect()
            }
            Err(err) => {
                debug!(probe = self.name(), %err, "Probe contributed nothing");
                HashSet::new()
            }
        }
    }
}

/// The built-in probes, auto-detecting their platform locations.
pub fn default_probes() -> Vec<Box<dyn RootProbe>> {
    vec![
        Box::new(SteamProbe::detect()),
        Box::new(OriginProbe::detect()),
        Box::new(EpicProbe::detect()),
        Box::new(GogProbe),
    ]
}

/// Union of every probe's roots. Empty when every probe fails.
pub fn locate_roots(probes: &[Box<dyn RootProbe>]) -> HashSet<PathBuf> {
    let mut roots = HashSet::new();
    for probe in probes {
        roots.extend(probe.discover_roots());
    }
    info!("Located {} search roots from {} probes", roots.len(), probes.len());
    roots
}

/// [`locate_roots`] over [`default_probes`].
pub fn locate_default_roots() -> HashSet<PathBuf> {
    locate_roots(&default_probes())
}

/// Push `dir` when it is an existing directory.
fn push_existing(roots: &mut Vec<PathBuf>, dir: PathBuf) {
    if dir.is_dir() {
        roots.push(dir);
    }
}

fn read_manifest(path: &Path) -> Result<String, ProbeError> {
    std::fs::read_to_string(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
