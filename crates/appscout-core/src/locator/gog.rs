/// GOG Galaxy probe. Every game GOG installs registers its folder under
/// `HKLM\Software\Wow6432Node\GOG.com\Games\<id>` with a `path` value.
use super::{ProbeError, RootProbe};
use std::path::PathBuf;

pub struct GogProbe;

#[cfg(windows)]
const GOG_GAMES_KEY: &str = r"Software\Wow6432Node\GOG.com\Games";

impl RootProbe for GogProbe {
    fn name(&self) -> &'static str {
        "gog"
    }

    #[cfg(windows)]
    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError> {
        use crate::platform::registry::RegistryKey;

        let games = RegistryKey::open_local_machine(GOG_GAMES_KEY)
            .ok_or(ProbeError::NotInstalled("GOG Galaxy"))?;

        let mut roots = Vec::new();
        for id in games.subkey_names() {
            let Some(path) = games.subkey(&id).and_then(|game| game.string_value("path")) else {
                continue;
            };
            super::push_existing(&mut roots, PathBuf::from(path));
        }
        Ok(roots)
    }

    #[cfg(not(windows))]
    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}
