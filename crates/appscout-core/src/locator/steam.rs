/// Steam probe: the client's own library plus every extra library folder
/// declared in `config/libraryfolders.vdf`.
use super::{push_existing, read_manifest, ProbeError, RootProbe};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[cfg(windows)]
const STEAM_REGISTRY_KEY: &str = r"Software\Wow6432Node\Valve\Steam";

/// Install locations relative to the home directory, most specific first.
#[cfg(target_os = "macos")]
const HOME_INSTALL_DIRS: &[&str] = &["Library/Application Support/Steam"];
#[cfg(all(unix, not(target_os = "macos")))]
const HOME_INSTALL_DIRS: &[&str] = &[".steam/steam", ".local/share/Steam"];

pub struct SteamProbe {
    install_dir: Option<PathBuf>,
}

impl SteamProbe {
    /// Probe the Steam client installed on this machine, if any.
    pub fn detect() -> Self {
        Self {
            install_dir: detect_install_dir(),
        }
    }

    /// Probe a Steam install rooted at `install_dir`.
    pub fn at(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: Some(install_dir.into()),
        }
    }
}

#[cfg(windows)]
fn detect_install_dir() -> Option<PathBuf> {
    crate::platform::registry::local_machine_string(STEAM_REGISTRY_KEY, "InstallPath")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(not(windows))]
fn detect_install_dir() -> Option<PathBuf> {
    let home = crate::platform::home_dir()?;
    HOME_INSTALL_DIRS
        .iter()
        .map(|relative| home.join(relative))
        .find(|dir| dir.is_dir())
}

/// `<library>/steamapps/common`, where Steam puts installed titles.
fn common_dir(library: &Path) -> PathBuf {
    library.join("steamapps").join("common")
}

fn library_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""path"\s+"(.+)""#).expect("valid library path regex"))
}

/// Library folders declared in a `libraryfolders.vdf` manifest.
///
/// The manifest is a KeyValues text file; only `"path" "<dir>"` pairs
/// matter here. Backslashes are stored doubled and are unescaped.
pub fn library_folders(manifest: &str) -> Vec<PathBuf> {
    library_path_pattern()
        .captures_iter(manifest)
        .map(|caps| PathBuf::from(caps[1].replace(r"\\", r"\")))
        .collect()
}

impl RootProbe for SteamProbe {
    fn name(&self) -> &'static str {
        "steam"
    }

    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError> {
        let install = self
            .install_dir
            .as_deref()
            .filter(|dir| dir.is_dir())
            .ok_or(ProbeError::NotInstalled("Steam"))?;

        let mut roots = Vec::new();
        push_existing(&mut roots, common_dir(install));

        // A broken manifest only loses the extra libraries.
        let manifest_path = install.join("config").join("libraryfolders.vdf");
        match read_manifest(&manifest_path) {
            Ok(manifest) => {
                for library in library_folders(&manifest) {
                    push_existing(&mut roots, common_dir(&library));
                }
            }
            Err(err) => tracing::debug!(%err, "Steam library manifest unavailable"),
        }

        Ok(roots)
    }
}
