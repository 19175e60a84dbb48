//! Archive writer
//!
//! Walks the source directory and writes every file into a new
//! deflate-compressed ZIP named after the creation time.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ArchivistError, ArchivistResult};

use super::naming::{archive_filename, parse_archive_timestamp};

/// A file that will be written into an archive
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute or working-directory-relative path on disk
    pub path: PathBuf,
    /// Entry name inside the archive, relative to the source root, `/`-separated
    pub name: String,
    /// Size in bytes at the time of the walk
    pub size_bytes: u64,
}

/// Outcome of a successful backup
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Archive filename
    pub filename: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Creation time encoded in the filename
    pub created_at: NaiveDateTime,
    /// Number of files written
    pub file_count: usize,
    /// Size of the archive on disk
    pub size_bytes: u64,
}

/// Writes a source directory into timestamped archives
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    source_dir: PathBuf,
    archive_dir: PathBuf,
}

impl ArchiveWriter {
    /// Create a writer for a source directory and an archive directory
    pub fn new(source_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    /// Directory being backed up
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory archives are written to
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Create a backup named after the current local time
    pub fn create_backup(&self) -> ArchivistResult<BackupReport> {
        self.create_backup_at(Local::now().naive_local())
    }

    /// Create a backup named after the given time
    ///
    /// Fails without creating anything if the source directory is missing.
    /// An archive with the same name is never overwritten. If writing fails
    /// part way, the partial archive is removed.
    pub fn create_backup_at(&self, timestamp: NaiveDateTime) -> ArchivistResult<BackupReport> {
        self.ensure_source()?;

        fs::create_dir_all(&self.archive_dir).map_err(|e| {
            ArchivistError::Io(format!(
                "Failed to create archive directory {}: {}",
                self.archive_dir.display(),
                e
            ))
        })?;

        let files = self.source_files()?;

        let filename = archive_filename(timestamp);
        let path = self.archive_dir.join(&filename);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    ArchivistError::Duplicate {
                        entity_type: "Archive",
                        identifier: filename.clone(),
                    }
                } else {
                    ArchivistError::Io(format!("Failed to create {}: {}", path.display(), e))
                }
            })?;

        if let Err(e) = write_archive(file, &files) {
            discard_partial(&path);
            return Err(e);
        }

        let size_bytes = fs::metadata(&path)
            .map_err(|e| ArchivistError::Io(format!("Failed to stat {}: {}", path.display(), e)))?
            .len();

        info!(
            archive = %path.display(),
            files = files.len(),
            bytes = size_bytes,
            "backup created"
        );

        Ok(BackupReport {
            filename,
            path,
            created_at: timestamp,
            file_count: files.len(),
            size_bytes,
        })
    }

    /// Number of files the next backup would capture
    pub fn count_files(&self) -> ArchivistResult<usize> {
        self.ensure_source()?;
        Ok(self.source_files()?.len())
    }

    /// Walk the source directory in file-name order
    ///
    /// Only regular files (and symlinks pointing at files) become entries.
    /// The archive directory is skipped when it lives inside the source. When
    /// it is the source itself, earlier archives at the top level are skipped.
    pub fn source_files(&self) -> ArchivistResult<Vec<SourceFile>> {
        let archive_dir = fs::canonicalize(&self.archive_dir).ok();
        let archives_in_root = match (&archive_dir, fs::canonicalize(&self.source_dir)) {
            (Some(archive_dir), Ok(source_dir)) => *archive_dir == source_dir,
            _ => false,
        };
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match (&archive_dir, fs::canonicalize(entry.path())) {
                    (Some(archive_dir), Ok(dir)) => &dir != archive_dir,
                    _ => true,
                }
            });

        for entry in walker {
            let entry = entry?;
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            if archives_in_root
                && entry.depth() == 1
                && parse_archive_timestamp(&entry.file_name().to_string_lossy()).is_some()
            {
                debug!(file = %entry.path().display(), "skipping earlier archive");
                continue;
            }

            let relative = entry.path().strip_prefix(&self.source_dir).map_err(|e| {
                ArchivistError::Io(format!(
                    "{} is outside {}: {}",
                    entry.path().display(),
                    self.source_dir.display(),
                    e
                ))
            })?;

            let size_bytes = fs::metadata(entry.path())
                .map_err(|e| {
                    ArchivistError::Io(format!("Failed to stat {}: {}", entry.path().display(), e))
                })?
                .len();

            debug!(file = %entry.path().display(), "queued for backup");
            files.push(SourceFile {
                path: entry.path().to_path_buf(),
                name: entry_name(relative),
                size_bytes,
            });
        }

        Ok(files)
    }

    fn ensure_source(&self) -> ArchivistResult<()> {
        if self.source_dir.is_dir() {
            Ok(())
        } else {
            Err(ArchivistError::SourceNotFound(
                self.source_dir.display().to_string(),
            ))
        }
    }
}

/// ZIP entry name for a path relative to the source root
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_archive(file: File, files: &[SourceFile]) -> ArchivistResult<()> {
    let mut zip = ZipWriter::new(BufWriter::new(file));
    for source in files {
        let mut options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(source.size_bytes >= u64::from(u32::MAX));
        if let Some(modified) = modified_time(&source.path) {
            options = options.last_modified_time(modified);
        }

        zip.start_file(source.name.as_str(), options)?;

        let mut input = File::open(&source.path).map_err(|e| {
            ArchivistError::Io(format!("Failed to open {}: {}", source.path.display(), e))
        })?;
        io::copy(&mut input, &mut zip).map_err(|e| {
            ArchivistError::Io(format!("Failed to archive {}: {}", source.path.display(), e))
        })?;
    }

    let mut writer = zip.finish()?;
    writer
        .flush()
        .map_err(|e| ArchivistError::Io(format!("Failed to flush archive: {}", e)))?;

    Ok(())
}

/// File modification time in the form ZIP stores it (local, 1980 or later)
fn modified_time(path: &Path) -> Option<zip::DateTime> {
    let modified: DateTime<Local> = fs::metadata(path).ok()?.modified().ok()?.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(modified.year()).ok()?,
        modified.month() as u8,
        modified.day() as u8,
        modified.hour() as u8,
        modified.minute() as u8,
        modified.second() as u8,
    )
    .ok()
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(archive = %path.display(), error = %e, "failed to remove partial archive");
    }
}
