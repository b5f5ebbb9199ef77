use super::{ProbeError, RootProbe};
use std::path::PathBuf;

/// Epic Games Launcher probe. Titles install under `Program Files\Epic Games`
/// unless the user picked another folder, which the launcher does not
/// record anywhere readable.
pub struct EpicProbe {
    games_dir: Option<PathBuf>,
}

impl EpicProbe {
    pub fn detect() -> Self {
        Self {
            games_dir: crate::platform::program_files().map(|dir| dir.join("Epic Games")),
        }
    }

    pub fn at(games_dir: impl Into<PathBuf>) -> Self {
        Self {
            games_dir: Some(games_dir.into()),
        }
    }
}

impl RootProbe for EpicProbe {
    fn name(&self) -> &'static str {
        "epic"
    }

    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError> {
        match &self.games_dir {
            Some(dir) if dir.is_dir() => Ok(vec![dir.clone()]),
            _ => Err(ProbeError::NotInstalled("Epic Games Launcher")),
        }
    }
}
