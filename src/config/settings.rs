//! User settings for Archivist
//!
//! Manages the source and archive directories, the retention policy and
//! whether a sweep follows every backup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ArchivistPaths;
use crate::error::ArchivistError;

/// Settings for Archivist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Directory whose contents are backed up
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Directory where archives are written
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Archives older than this many whole days are swept
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Run the retention sweep after every successful backup
    #[serde(default = "default_sweep_after_backup")]
    pub sweep_after_backup: bool,

    /// Restore destination used when none is given
    #[serde(default = "default_restore_dir")]
    pub restore_dir: PathBuf,
}

fn default_schema_version() -> u32 {
    1
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("data_mentah")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("backup_results")
}

fn default_retention_days() -> u32 {
    7
}

fn default_sweep_after_backup() -> bool {
    true
}

fn default_restore_dir() -> PathBuf {
    PathBuf::from("restored_data")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            source_dir: default_source_dir(),
            archive_dir: default_archive_dir(),
            retention_days: default_retention_days(),
            sweep_after_backup: default_sweep_after_backup(),
            restore_dir: default_restore_dir(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub source_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub retention_days: Option<u32>,
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ArchivistPaths) -> Result<Self, ArchivistError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ArchivistError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ArchivistError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ArchivistPaths) -> Result<(), ArchivistError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ArchivistError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ArchivistError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Apply command-line or environment overrides on top of loaded settings
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(source_dir) = overrides.source_dir {
            self.source_dir = source_dir;
        }
        if let Some(archive_dir) = overrides.archive_dir {
            self.archive_dir = archive_dir;
        }
        if let Some(retention_days) = overrides.retention_days {
            self.retention_days = retention_days;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.source_dir, PathBuf::from("data_mentah"));
        assert_eq!(settings.archive_dir, PathBuf::from("backup_results"));
        assert_eq!(settings.retention_days, 7);
        assert!(settings.sweep_after_backup);
        assert_eq!(settings.restore_dir, PathBuf::from("restored_data"));
    }

    #[test]
    fn test_load_without_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivistPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!paths.settings_file().exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivistPaths::with_base_dir(temp_dir.path().join("cfg"));

        let settings = Settings {
            retention_days: 30,
            sweep_after_backup: false,
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.retention_days, 30);
        assert!(!loaded.sweep_after_backup);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivistPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"retention_days": 14}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.retention_days, 14);
        assert_eq!(loaded.archive_dir, PathBuf::from("backup_results"));
        assert!(loaded.sweep_after_backup);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivistPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, ArchivistError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default().with_overrides(SettingsOverrides {
            source_dir: Some(PathBuf::from("/tmp/src")),
            archive_dir: None,
            retention_days: Some(1),
        });

        assert_eq!(settings.source_dir, PathBuf::from("/tmp/src"));
        assert_eq!(settings.archive_dir, PathBuf::from("backup_results"));
        assert_eq!(settings.retention_days, 1);
    }
}
