/// Validation of an executable path the user typed or picked by hand,
/// bypassing discovery.
use crate::config::has_extension;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no path given")]
    Empty,

    #[error("{0} is not an absolute path")]
    NotAbsolute(PathBuf),

    #[error("{0} does not exist or is not a file")]
    NotFound(PathBuf),

    #[error("{path} is not a .{extension} file")]
    WrongExtension {
        path: PathBuf,
        extension: &'static str,
    },
}

/// Accept `input` as the chosen executable.
///
/// Surrounding whitespace and a pair of enclosing double quotes (as left by
/// "Copy as path") are stripped first.
pub fn resolve_manual_override(
    input: &str,
    extension: &'static str,
) -> Result<PathBuf, SelectionError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    if trimmed.is_empty() {
        return Err(SelectionError::Empty);
    }

    let path = PathBuf::from(trimmed);
    if !path.is_absolute() {
        return Err(SelectionError::NotAbsolute(path));
    }
    if !has_extension(&path, extension) {
        return Err(SelectionError::WrongExtension { path, extension });
    }
    if !path.is_file() {
        return Err(SelectionError::NotFound(path));
    }
    Ok(path)
}
