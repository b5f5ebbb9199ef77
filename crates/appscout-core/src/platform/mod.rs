/// Platform-specific functionality: well-known folder lookup and, on
/// Windows, read-only registry access for provenance probes.

pub mod known_folders;
#[cfg(windows)]
pub mod registry;

pub use known_folders::{home_dir, program_files, roaming_app_data};

/// Name of the operating system's own directory, never an application root.
pub const SYSTEM_DIRECTORY_NAME: &str = "Windows";
