/// Turns an accepted executable path into a [`DiscoveredItem`].
///
/// Extraction never rejects a candidate: a missing version resource falls
/// back to the file name, a missing icon becomes `None`, and an unreadable
/// timestamp becomes an empty string.
pub mod pe;

use crate::model::DiscoveredItem;
use chrono::{DateTime, Local};
use compact_str::{format_compact, CompactString};
use std::path::Path;
use std::time::SystemTime;

/// `strftime` pattern for last-access stamps. Fixed width, so string order
/// equals time order.
pub const LAST_ACCESS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build the item for `path`. This is the expensive per-file step (file
/// open, resource walk, icon assembly) and is run batch-wise by the worker.
pub fn extract_item(path: &Path) -> DiscoveredItem {
    let resources = match pe::read_resources(path) {
        Ok(section) => Some(section),
        Err(err) => {
            tracing::trace!(path = %path.display(), %err, "No readable resources");
            None
        }
    };

    let description = resources.as_ref().and_then(|r| r.file_description());
    let icon = resources.as_ref().and_then(|r| r.icon());

    DiscoveredItem::new(
        path.to_path_buf(),
        display_name(path, description.as_deref()),
        icon,
        last_access(path),
    )
}

/// `"<description or title-cased stem> (<file name>)"`.
///
/// A blank description is ignored. The stem is only title-cased when it
/// starts with a lowercase letter, so names like `TESV` or `Game` keep
/// their original spelling.
pub fn display_name(path: &Path, description: Option<&str>) -> CompactString {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => description.to_owned(),
        None => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if stem.chars().next().is_some_and(char::is_lowercase) {
                title_case(&stem)
            } else {
                stem
            }
        }
    };

    format_compact!("{name} ({file_name})")
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// Words are runs of alphanumerics (apostrophes stay inside a word). Words
/// written entirely in capitals are treated as acronyms and kept as-is.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        if word.is_empty() {
            return;
        }
        let has_lower = word.chars().any(char::is_lowercase);
        let has_upper = word.chars().any(char::is_uppercase);
        if has_upper && !has_lower {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                for c in chars {
                    out.extend(c.to_lowercase());
                }
            }
        }
        word.clear();
    };

    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' {
            word.push(c);
        } else {
            flush(&mut word, &mut out);
            out.push(c);
        }
    }
    flush(&mut word, &mut out);
    out
}

/// Last-access time of `path`, or an empty string when the platform or
/// filesystem does not provide one.
pub fn last_access(path: &Path) -> String {
    match std::fs::metadata(path).and_then(|meta| meta.accessed()) {
        Ok(time) => format_timestamp(time),
        Err(err) => {
            tracing::trace!(path = %path.display(), %err, "Last-access time unavailable");
            String::new()
        }
    }
}

/// Format `time` in local time with [`LAST_ACCESS_FORMAT`].
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(LAST_ACCESS_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn description_wins_over_file_name() {
        let name = display_name(Path::new("/games/hl2/hl2.exe"), Some("Half-Life 2"));
        assert_eq!(name, "Half-Life 2 (hl2.exe)");
    }

    #[test]
    fn lowercase_stem_is_title_cased() {
        let name = display_name(Path::new("/games/foo/bar.exe"), None);
        assert_eq!(name, "Bar (bar.exe)");
    }

    #[test]
    fn blank_description_falls_back_to_stem() {
        let name = display_name(Path::new("/games/foo/bar.exe"), Some("  \t"));
        assert_eq!(name, "Bar (bar.exe)");
    }

    #[test]
    fn capitalised_stem_is_kept() {
        let name = display_name(Path::new("/games/skyrim/TESV.exe"), None);
        assert_eq!(name, "TESV (TESV.exe)");
        let name = display_name(Path::new("/games/x/MyGame.exe"), None);
        assert_eq!(name, "MyGame (MyGame.exe)");
    }

    #[test]
    fn title_case_handles_word_boundaries() {
        assert_eq!(title_case("half-life"), "Half-Life");
        assert_eq!(title_case("my game"), "My Game");
        assert_eq!(title_case("hl2_win64"), "Hl2_Win64");
        assert_eq!(title_case("dark souls III"), "Dark Souls III");
        assert_eq!(title_case("baldur's gate"), "Baldur's Gate");
    }

    #[test]
    fn display_name_always_ends_with_file_name() {
        for (path, description) in [
            ("/a/b/game.exe", None),
            ("/a/b/game.exe", Some("Great Game")),
            ("/a/b/UPPER.EXE", None),
        ] {
            let path = Path::new(path);
            let file_name = path.file_name().unwrap().to_string_lossy();
            let name = display_name(path, description);
            assert!(
                name.ends_with(&format!("({file_name})")),
                "{name} does not end with ({file_name})"
            );
        }
    }

    #[test]
    fn timestamp_format_is_sortable() {
        let stamp = format_timestamp(SystemTime::now());
        assert_eq!(stamp.len(), 19, "unexpected stamp {stamp}");
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
    }

    /// A file that is not a PE image still yields an item with the
    /// fallback name and no icon.
    #[test]
    fn non_pe_file_degrades_gracefully() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bar.exe");
        fs::write(&path, b"#!/bin/sh\necho hi\n").unwrap();

        let item = extract_item(&path);
        assert_eq!(item.path(), path.as_path());
        assert_eq!(item.display_name(), "Bar (bar.exe)");
        assert!(!item.has_icon());
    }

    #[test]
    fn missing_file_has_empty_last_access() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(last_access(&tmp.path().join("gone.exe")), "");
    }
}
