/// Origin probe. The client records its download directory in the
/// per-user `local.xml` settings file.
use super::{read_manifest, ProbeError, RootProbe};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Settings key holding the game install directory.
const DOWNLOAD_DIR_KEY: &str = "DownloadInPlaceDir";

/// Shorter values are the client's placeholder defaults, not real
/// install directories.
const MIN_DOWNLOAD_DIR_CHARS: usize = 26;

pub struct OriginProbe {
    settings_file: Option<PathBuf>,
}

impl OriginProbe {
    /// Probe `%AppData%\Origin\local.xml` for the current user.
    pub fn detect() -> Self {
        Self {
            settings_file: crate::platform::roaming_app_data()
                .map(|dir| dir.join("Origin").join("local.xml")),
        }
    }

    /// Probe an explicit settings file.
    pub fn at(settings_file: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: Some(settings_file.into()),
        }
    }
}

fn setting_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<Setting\b([^>]*)>").expect("valid setting regex"))
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
    })
}

/// Decode the five predefined XML entities.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Every `DownloadInPlaceDir` value in an Origin settings document.
pub fn download_dirs(settings: &str) -> Result<Vec<String>, ProbeError> {
    if !settings.contains("<Settings") {
        return Err(ProbeError::Malformed("Origin settings file"));
    }

    let mut dirs = Vec::new();
    for element in setting_pattern().captures_iter(settings) {
        let mut key = None;
        let mut value = None;
        for attr in attribute_pattern().captures_iter(&element[1]) {
            let text = attr.get(2).or_else(|| attr.get(3)).map_or("", |m| m.as_str());
            match &attr[1] {
                "key" => key = Some(text),
                "value" => value = Some(text),
                _ => {}
            }
        }
        if let (Some(DOWNLOAD_DIR_KEY), Some(value)) = (key, value) {
            dirs.push(decode_entities(value));
        }
    }
    Ok(dirs)
}

impl RootProbe for OriginProbe {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn probe(&self) -> Result<Vec<PathBuf>, ProbeError> {
        let path = self
            .settings_file
            .as_deref()
            .filter(|file| file.is_file())
            .ok_or(ProbeError::NotInstalled("Origin"))?;

        let settings = read_manifest(path)?;
        Ok(download_dirs(&settings)?
            .into_iter()
            .filter(|dir| dir.chars().count() >= MIN_DOWNLOAD_DIR_CHARS)
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
            .collect())
    }
}
