//! Directories the app reads from: next to the executable first, so a
//! standalone install carries its own settings, then the per-user config dir.

use std::path::{Path, PathBuf};

/// Directory containing the running executable. Falls back to current directory if unavailable.
pub fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Per-user configuration directory, if the platform has one.
pub fn config_directory() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "StampGrid").map(|d| d.config_dir().to_path_buf())
}

/// Directory image paths in a catalog resolve against.
pub fn catalog_base(catalog_path: &Path) -> PathBuf {
    catalog_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
