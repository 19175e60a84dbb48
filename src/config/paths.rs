//! Path management for Archivist
//!
//! Resolves where the settings file lives. The source and archive directories
//! themselves come from [`Settings`](super::settings::Settings).
//!
//! ## Path Resolution Order
//!
//! 1. `ARCHIVIST_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/archivist` or `~/.config/archivist`
//! 3. Windows: `%APPDATA%\archivist`

use std::path::{Path, PathBuf};

use crate::error::ArchivistError;

/// Manages the configuration paths used by Archivist
#[derive(Debug, Clone)]
pub struct ArchivistPaths {
    /// Base directory for Archivist configuration
    base_dir: PathBuf,
}

impl ArchivistPaths {
    /// Create a new ArchivistPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, ArchivistError> {
        let base_dir = if let Ok(custom) = std::env::var("ARCHIVIST_CONFIG_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ArchivistPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/archivist/ or equivalent)
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_directories(&self) -> Result<(), ArchivistError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            ArchivistError::Io(format!("Failed to create config directory: {}", e))
        })
    }
}

/// Resolve the default config directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, ArchivistError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("archivist"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| ArchivistError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".config").join("archivist"))
}

/// Resolve the default config directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, ArchivistError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ArchivistError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("archivist"))
}
