//! Backup manager for Archivist
//!
//! Ties the writer and the retention sweeper to a [`Settings`] value and
//! provides listing, lookup and bulk deletion over the archive directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{info, warn};

use crate::config::settings::Settings;
use crate::error::{ArchivistError, ArchivistResult};

use super::naming::{has_archive_suffix, parse_archive_timestamp, ARCHIVE_SUFFIX};
use super::retention::{RetentionSweeper, SweepReport};
use super::writer::{ArchiveWriter, BackupReport};

/// Metadata about an archive file on disk
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Archive filename
    pub filename: String,
    /// Full path to archive
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Filesystem modification time
    pub modified: Option<DateTime<Local>>,
    /// Creation time parsed from the filename, if it follows the pattern
    pub created_at: Option<NaiveDateTime>,
}

/// What happened to the sweep that follows a backup
#[derive(Debug, Clone)]
pub enum SweepStatus {
    /// Sweeping after backup is disabled
    Skipped,
    /// The sweep ran
    Completed(SweepReport),
    /// The sweep could not read the archive directory
    Failed(String),
}

/// Result of a backup and its follow-up sweep
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    /// The archive that was written
    pub backup: BackupReport,
    /// What the follow-up sweep did
    pub sweep: SweepStatus,
}

/// Manages backup creation, listing and retention
#[derive(Debug, Clone)]
pub struct BackupManager {
    settings: Settings,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Settings this manager was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get archive directory path
    pub fn archive_dir(&self) -> &Path {
        &self.settings.archive_dir
    }

    /// Writer over the configured directories
    pub fn writer(&self) -> ArchiveWriter {
        ArchiveWriter::new(&self.settings.source_dir, &self.settings.archive_dir)
    }

    /// Sweeper over the configured archive directory
    pub fn sweeper(&self) -> RetentionSweeper {
        RetentionSweeper::new(&self.settings.archive_dir, self.settings.retention_days)
    }

    /// Create a backup, sweeping afterwards if the settings ask for it
    pub fn create_backup(&self) -> ArchivistResult<BackupOutcome> {
        self.create_backup_with(self.settings.sweep_after_backup)
    }

    /// Create a backup now, optionally followed by a sweep
    pub fn create_backup_with(&self, sweep: bool) -> ArchivistResult<BackupOutcome> {
        self.create_backup_at(Local::now().naive_local(), sweep)
    }

    /// Create a backup as of `now`, optionally followed by a sweep as of `now`
    ///
    /// A sweep failure does not undo or fail the backup.
    pub fn create_backup_at(
        &self,
        now: NaiveDateTime,
        sweep: bool,
    ) -> ArchivistResult<BackupOutcome> {
        let backup = self.writer().create_backup_at(now)?;

        let sweep = if sweep {
            sweep_status(self.sweeper().sweep_at(now))
        } else {
            SweepStatus::Skipped
        };

        Ok(BackupOutcome { backup, sweep })
    }

    /// List every `.zip` in the archive directory, in directory order
    pub fn list_backups(&self) -> ArchivistResult<Vec<ArchiveEntry>> {
        list_archives(&self.settings.archive_dir)
    }

    /// Get the newest archive by the time encoded in its name
    pub fn get_latest_backup(&self) -> ArchivistResult<Option<ArchiveEntry>> {
        let backups = self.list_backups()?;
        Ok(backups
            .into_iter()
            .filter(|b| b.created_at.is_some())
            .max_by_key(|b| b.created_at))
    }

    /// Resolve an archive identifier to a path
    ///
    /// Accepts `latest`, a 1-based position in [`list_backups`](Self::list_backups),
    /// a filename in the archive directory (with or without `.zip`), or a path.
    pub fn resolve_backup(&self, identifier: &str) -> ArchivistResult<PathBuf> {
        if identifier.eq_ignore_ascii_case("latest") {
            return self
                .get_latest_backup()?
                .map(|b| b.path)
                .ok_or_else(|| ArchivistError::archive_not_found("latest"));
        }

        if let Ok(index) = identifier.parse::<usize>() {
            let backups = self.list_backups()?;
            return index
                .checked_sub(1)
                .and_then(|i| backups.into_iter().nth(i))
                .map(|b| b.path)
                .ok_or_else(|| ArchivistError::archive_not_found(identifier));
        }

        let in_dir = self.settings.archive_dir.join(identifier);
        if in_dir.is_file() {
            return Ok(in_dir);
        }

        let with_suffix = self
            .settings
            .archive_dir
            .join(format!("{}{}", identifier, ARCHIVE_SUFFIX));
        if with_suffix.is_file() {
            return Ok(with_suffix);
        }

        let path = PathBuf::from(identifier);
        if path.is_file() {
            return Ok(path);
        }

        Err(ArchivistError::archive_not_found(identifier))
    }

    /// Delete the whole archive directory
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn purge_backups(&self) -> ArchivistResult<bool> {
        let dir = &self.settings.archive_dir;
        if !dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(dir).map_err(|e| {
            ArchivistError::Io(format!("Failed to delete {}: {}", dir.display(), e))
        })?;
        info!(dir = %dir.display(), "deleted all archives");

        Ok(true)
    }
}

/// Turn the result of a post-backup sweep into a status
fn sweep_status(result: ArchivistResult<SweepReport>) -> SweepStatus {
    match result {
        Ok(report) => SweepStatus::Completed(report),
        Err(e) => {
            warn!(error = %e, "retention sweep after backup failed");
            SweepStatus::Failed(e.to_string())
        }
    }
}

/// List every `.zip` in a directory, in directory order
///
/// A missing directory yields an empty list.
pub fn list_archives(archive_dir: &Path) -> ArchivistResult<Vec<ArchiveEntry>> {
    if !archive_dir.exists() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();

    for entry in fs::read_dir(archive_dir).map_err(|e| {
        ArchivistError::Io(format!("Failed to read archive directory: {}", e))
    })? {
        let entry = entry
            .map_err(|e| ArchivistError::Io(format!("Failed to read directory entry: {}", e)))?;

        let filename = entry.file_name().to_string_lossy().to_string();
        if !has_archive_suffix(&filename) {
            continue;
        }

        // Follows symlinks so listing and sweeping agree on what is an archive
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                warn!(file = %filename, error = %e, "skipping unreadable archive entry");
                continue;
            }
        };

        archives.push(ArchiveEntry {
            created_at: parse_archive_timestamp(&filename),
            path: entry.path(),
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            filename,
        });
    }

    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_manager(temp: &TempDir) -> BackupManager {
        let source_dir = temp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(source_dir.join("a.txt"), "alpha").unwrap();

        BackupManager::new(Settings {
            source_dir,
            archive_dir: temp.path().join("archives"),
            retention_days: 7,
            ..Settings::default()
        })
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_backup_then_sweep() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);

        manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        let outcome = manager.create_backup_at(at(2024, 1, 20), true).unwrap();

        match outcome.sweep {
            SweepStatus::Completed(report) => {
                assert_eq!(report.deleted_count(), 1);
                assert_eq!(report.deleted[0].filename, "backup_20240101_090000.zip");
            }
            other => panic!("unexpected sweep status: {:?}", other),
        }

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].filename, "backup_20240120_090000.zip");
    }

    #[test]
    fn test_sweep_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);

        manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        let outcome = manager.create_backup_at(at(2024, 1, 20), false).unwrap();

        assert!(matches!(outcome.sweep, SweepStatus::Skipped));
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_list_includes_non_pattern_zips() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);
        manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        fs::write(manager.archive_dir().join("notes.zip"), "x").unwrap();
        fs::write(manager.archive_dir().join("notes.txt"), "x").unwrap();

        let backups = manager.list_backups().unwrap();
        let mut names: Vec<_> = backups.iter().map(|b| b.filename.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["backup_20240101_090000.zip", "notes.zip"]);

        let notes = backups.iter().find(|b| b.filename == "notes.zip").unwrap();
        assert!(notes.created_at.is_none());
        assert_eq!(notes.size_bytes, 1);
        assert!(notes.modified.is_some());
    }

    #[test]
    fn test_sweep_failure_is_reported_not_raised() {
        let status = sweep_status(Err(ArchivistError::Io("permission denied".into())));

        match status {
            SweepStatus::Failed(reason) => assert!(reason.contains("permission denied")),
            other => panic!("unexpected sweep status: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_archive_is_listed_and_swept() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);
        let outcome = manager.create_backup_at(at(2024, 1, 1), false).unwrap();

        let elsewhere = temp.path().join("elsewhere.zip");
        fs::rename(&outcome.backup.path, &elsewhere).unwrap();
        std::os::unix::fs::symlink(&elsewhere, &outcome.backup.path).unwrap();
        std::os::unix::fs::symlink(temp.path(), manager.archive_dir().join("dir_link.zip"))
            .unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].filename, "backup_20240101_090000.zip");
        assert_eq!(backups[0].size_bytes, fs::metadata(&elsewhere).unwrap().len());

        let report = manager.sweeper().sweep_at(at(2024, 2, 1)).unwrap();
        assert_eq!(report.deleted_count(), 1);
        assert!(manager.list_backups().unwrap().is_empty());
        assert!(elsewhere.exists());
    }

    #[test]
    fn test_empty_archive_dir() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);

        assert!(manager.list_backups().unwrap().is_empty());
        assert!(manager.get_latest_backup().unwrap().is_none());
    }

    #[test]
    fn test_get_latest_backup() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);

        manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        let newest = manager.create_backup_at(at(2024, 2, 1), false).unwrap();
        manager.create_backup_at(at(2024, 1, 15), false).unwrap();

        let latest = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(latest.path, newest.backup.path);
    }

    #[test]
    fn test_resolve_backup() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);
        let outcome = manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        let path = outcome.backup.path;

        assert_eq!(manager.resolve_backup("latest").unwrap(), path);
        assert_eq!(manager.resolve_backup("1").unwrap(), path);
        assert_eq!(
            manager.resolve_backup("backup_20240101_090000.zip").unwrap(),
            path
        );
        assert_eq!(
            manager.resolve_backup("backup_20240101_090000").unwrap(),
            path
        );
        assert_eq!(manager.resolve_backup(path.to_str().unwrap()).unwrap(), path);

        assert!(manager.resolve_backup("0").unwrap_err().is_not_found());
        assert!(manager.resolve_backup("2").unwrap_err().is_not_found());
        assert!(manager.resolve_backup("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_purge_backups() {
        let temp = TempDir::new().unwrap();
        let manager = create_test_manager(&temp);

        assert!(!manager.purge_backups().unwrap());

        manager.create_backup_at(at(2024, 1, 1), false).unwrap();
        assert!(manager.purge_backups().unwrap());
        assert!(!manager.archive_dir().exists());
        assert!(manager.list_backups().unwrap().is_empty());
    }
}
