/// Well-known folder lookup.
///
/// On Windows the shell's known-folder API is authoritative (it honours
/// folder redirection). Elsewhere the `directories` crate supplies the
/// closest equivalents; `program_files` has none and returns `None`.
use std::path::PathBuf;

#[cfg(windows)]
mod imp {
    use std::path::PathBuf;
    use windows::core::GUID;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::{
        FOLDERID_Profile, FOLDERID_ProgramFiles, FOLDERID_RoamingAppData, SHGetKnownFolderPath,
        KF_FLAG_DEFAULT,
    };

    fn known_folder(id: &GUID) -> Option<PathBuf> {
        unsafe {
            let raw = SHGetKnownFolderPath(id, KF_FLAG_DEFAULT, HANDLE::default()).ok()?;
            // The shell allocates the string; it must be freed on every path.
            let path = raw.to_string();
            CoTaskMemFree(Some(raw.0 as *const _));
            path.ok().map(PathBuf::from)
        }
    }

    pub fn program_files() -> Option<PathBuf> {
        known_folder(&FOLDERID_ProgramFiles)
    }

    pub fn roaming_app_data() -> Option<PathBuf> {
        known_folder(&FOLDERID_RoamingAppData)
    }

    pub fn home_dir() -> Option<PathBuf> {
        known_folder(&FOLDERID_Profile)
    }
}

#[cfg(not(windows))]
mod imp {
    use directories::BaseDirs;
    use std::path::PathBuf;

    pub fn program_files() -> Option<PathBuf> {
        None
    }

    pub fn roaming_app_data() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn home_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

/// `C:\Program Files` (or its redirected location).
pub fn program_files() -> Option<PathBuf> {
    imp::program_files()
}

/// The per-user roaming application data folder (`%APPDATA%`).
pub fn roaming_app_data() -> Option<PathBuf> {
    imp::roaming_app_data()
}

/// The current user's home / profile directory.
pub fn home_dir() -> Option<PathBuf> {
    imp::home_dir()
}
