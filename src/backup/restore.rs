//! Backup restoration for Archivist
//!
//! Extracts archives into a destination directory and inspects archive
//! contents without extracting.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::ZipArchive;

use crate::error::{ArchivistError, ArchivistResult};

/// Handles restoring from archives
#[derive(Debug, Clone)]
pub struct RestoreManager {
    /// Destination used when the caller does not name one
    default_destination: PathBuf,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(default_destination: impl Into<PathBuf>) -> Self {
        Self {
            default_destination: default_destination.into(),
        }
    }

    /// Destination used when none is given
    pub fn default_destination(&self) -> &Path {
        &self.default_destination
    }

    /// Extract every entry of an archive
    ///
    /// The destination is created if needed. Existing files with the same
    /// names are overwritten; other files in the destination are left alone.
    pub fn restore(
        &self,
        archive_path: &Path,
        destination: Option<&Path>,
    ) -> ArchivistResult<RestoreResult> {
        let destination = destination.unwrap_or(&self.default_destination);
        let mut archive = open_archive(archive_path)?;

        fs::create_dir_all(destination).map_err(|e| {
            ArchivistError::Io(format!(
                "Failed to create restore directory {}: {}",
                destination.display(),
                e
            ))
        })?;

        archive.extract(destination).map_err(|e| {
            ArchivistError::Archive(format!(
                "Failed to extract {}: {}",
                archive_path.display(),
                e
            ))
        })?;

        let entry_count = archive.len();
        info!(
            archive = %archive_path.display(),
            destination = %destination.display(),
            entries = entry_count,
            "archive restored"
        );

        Ok(RestoreResult {
            archive: archive_path.to_path_buf(),
            destination: destination.to_path_buf(),
            entry_count,
        })
    }

    /// Read an archive's table of contents without extracting it
    pub fn inspect(&self, archive_path: &Path) -> ArchivistResult<ArchiveContents> {
        let mut archive = open_archive(archive_path)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            entries.push(ContentEntry {
                name: file.name().to_string(),
                size_bytes: file.size(),
                compressed_bytes: file.compressed_size(),
            });
        }

        Ok(ArchiveContents { entries })
    }
}

fn open_archive(archive_path: &Path) -> ArchivistResult<ZipArchive<BufReader<File>>> {
    if !archive_path.is_file() {
        return Err(ArchivistError::archive_not_found(
            archive_path.display().to_string(),
        ));
    }

    let file = File::open(archive_path).map_err(|e| {
        ArchivistError::Io(format!("Failed to open {}: {}", archive_path.display(), e))
    })?;

    ZipArchive::new(BufReader::new(file)).map_err(|e| {
        ArchivistError::Archive(format!(
            "Failed to read {}: {}",
            archive_path.display(),
            e
        ))
    })
}

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// Archive that was extracted
    pub archive: PathBuf,
    /// Directory it was extracted into
    pub destination: PathBuf,
    /// Number of entries in the archive
    pub entry_count: usize,
}

impl RestoreResult {
    /// One-line summary of the restore
    pub fn summary(&self) -> String {
        let name = self
            .archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.archive.display().to_string());
        format!(
            "Restored '{}' to '{}' ({} entries)",
            name,
            self.destination.display(),
            self.entry_count
        )
    }
}

/// One file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    pub size_bytes: u64,
    pub compressed_bytes: u64,
}

/// Table of contents of an archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveContents {
    pub entries: Vec<ContentEntry>,
}

impl ArchiveContents {
    /// Sum of uncompressed sizes
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::writer::ArchiveWriter;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    fn create_test_env() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("logs").join("2024")).unwrap();
        fs::write(source.join("data.csv"), "NIM,Nama\n001,Budi\n").unwrap();
        fs::write(source.join("logs").join("2024").join("app.log"), vec![7u8; 4096]).unwrap();
        fs::write(source.join("empty.txt"), "").unwrap();

        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let report = ArchiveWriter::new(&source, temp.path().join("archives"))
            .create_backup_at(timestamp)
            .unwrap();

        (temp, report.path)
    }

    #[test]
    fn test_restore_round_trip() {
        let (temp, archive) = create_test_env();
        let destination = temp.path().join("restored");
        let manager = RestoreManager::new(temp.path().join("default"));

        let result = manager.restore(&archive, Some(&destination)).unwrap();

        assert_eq!(result.entry_count, 3);
        assert_eq!(
            snapshot(&temp.path().join("source")),
            snapshot(&destination)
        );
        assert!(!temp.path().join("default").exists());
    }

    #[test]
    fn test_restore_to_default_destination() {
        let (temp, archive) = create_test_env();
        let default = temp.path().join("restored_data");
        let manager = RestoreManager::new(&default);

        let result = manager.restore(&archive, None).unwrap();

        assert_eq!(result.destination, default);
        assert!(default.join("data.csv").is_file());
        assert!(result.summary().contains("3 entries"));
    }

    #[test]
    fn test_restore_missing_archive() {
        let temp = TempDir::new().unwrap();
        let manager = RestoreManager::new(temp.path().join("out"));

        let err = manager
            .restore(&temp.path().join("backup_20240101_000000.zip"), None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_restore_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let corrupt = temp.path().join("backup_20240101_000000.zip");
        fs::write(&corrupt, "definitely not a zip file").unwrap();
        let manager = RestoreManager::new(temp.path().join("out"));

        let err = manager.restore(&corrupt, None).unwrap_err();
        assert!(matches!(err, ArchivistError::Archive(_)));
    }

    #[test]
    fn test_inspect() {
        let (_temp, archive) = create_test_env();
        let manager = RestoreManager::new("unused");

        let contents = manager.inspect(&archive).unwrap();
        let names: Vec<_> = contents.entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["data.csv", "empty.txt", "logs/2024/app.log"]);
        assert_eq!(contents.total_bytes(), 18 + 4096);
    }
}
