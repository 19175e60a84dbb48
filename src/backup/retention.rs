//! Retention sweeper
//!
//! Deletes archives whose embedded creation time is older than the
//! retention threshold. Age is counted in whole days and an archive is only
//! removed when its age is strictly greater than the threshold.
//!
//! Files that do not follow the archive naming pattern are never touched.
//! Concurrent runs against the same directory are not coordinated: a sweep
//! racing a writer may observe a half-written archive, which it will leave
//! alone unless it is already past the threshold by name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{ArchivistError, ArchivistResult};

use super::naming::parse_archive_timestamp;

/// An archive selected for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweptArchive {
    /// Archive filename
    pub filename: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Creation time parsed from the filename
    pub created_at: NaiveDateTime,
    /// Whole days between creation and the sweep
    pub age_days: i64,
}

/// An archive that was eligible but could not be deleted
#[derive(Debug, Clone)]
pub struct SweepFailure {
    /// Path that could not be removed
    pub path: PathBuf,
    /// Why the removal failed
    pub reason: String,
}

/// Result of one sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Archives that were removed
    pub deleted: Vec<SweptArchive>,
    /// Archives that should have been removed but were not
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Number of archives removed
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Whether any deletion failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Whole days elapsed between `created_at` and `now`
pub fn age_in_days(created_at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - created_at).num_days()
}

/// Whether an archive of the given age is past the threshold
pub fn is_expired(age_days: i64, retention_days: u32) -> bool {
    age_days > i64::from(retention_days)
}

/// Applies an age-based retention policy to an archive directory
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    archive_dir: PathBuf,
    retention_days: u32,
}

impl RetentionSweeper {
    /// Create a sweeper for a directory and threshold
    pub fn new(archive_dir: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            archive_dir: archive_dir.into(),
            retention_days,
        }
    }

    /// Retention threshold in days
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Sweep using the current local time
    pub fn sweep(&self) -> ArchivistResult<SweepReport> {
        self.sweep_at(Local::now().naive_local())
    }

    /// Sweep as if the current time were `now`
    pub fn sweep_at(&self, now: NaiveDateTime) -> ArchivistResult<SweepReport> {
        self.sweep_with(now, |path| fs::remove_file(path))
    }

    /// List the archives a sweep at `now` would delete, without deleting them
    pub fn plan_at(&self, now: NaiveDateTime) -> ArchivistResult<Vec<SweptArchive>> {
        if !self.archive_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.archive_dir).map_err(|e| {
            ArchivistError::Io(format!(
                "Failed to read archive directory {}: {}",
                self.archive_dir.display(),
                e
            ))
        })?;

        let mut expired = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            // Same rule as the lister: follow symlinks, only regular files count
            if !fs::metadata(entry.path()).map_or(false, |m| m.is_file()) {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().to_string();
            let Some(created_at) = parse_archive_timestamp(&filename) else {
                debug!(file = %filename, "not an archive name, skipping");
                continue;
            };

            let age_days = age_in_days(created_at, now);
            if is_expired(age_days, self.retention_days) {
                expired.push(SweptArchive {
                    filename,
                    path: entry.path(),
                    created_at,
                    age_days,
                });
            }
        }

        Ok(expired)
    }

    /// Sweep with a custom removal function
    ///
    /// A failed removal is recorded in the report and the sweep moves on.
    pub fn sweep_with<F>(
        &self,
        now: NaiveDateTime,
        mut remove: F,
    ) -> ArchivistResult<SweepReport>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let mut report = SweepReport::default();

        for archive in self.plan_at(now)? {
            match remove(&archive.path) {
                Ok(()) => {
                    info!(
                        archive = %archive.filename,
                        age_days = archive.age_days,
                        "deleted expired archive"
                    );
                    report.deleted.push(archive);
                }
                Err(e) => {
                    warn!(
                        archive = %archive.path.display(),
                        error = %e,
                        "failed to delete expired archive"
                    );
                    report.failures.push(SweepFailure {
                        path: archive.path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
