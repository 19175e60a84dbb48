//! Demo data for a fresh source directory
//!
//! Seeding is an explicit step. Backups never create the source directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ArchivistError, ArchivistResult};

/// Files written into a freshly seeded source directory
pub const DEMO_FILES: &[(&str, &str)] = &[
    (
        "data_mahasiswa.csv",
        "NIM,Nama,Nilai\n001,Budi,85\n002,Ani,90\n003,Cici,78",
    ),
    (
        "log_system.txt",
        "2024-01-15 10:30:00 - System started\n2024-01-15 11:00:00 - Backup completed",
    ),
    (
        "config.json",
        r#"{"server": "localhost", "port": 8080, "autobackup": true}"#,
    ),
    (
        "readme.md",
        "# Source Data\n\nThis folder holds the data used by the backup exercise.",
    ),
];

/// Create the source directory with demo files
///
/// Returns the created files, or `None` if the directory already existed, in
/// which case nothing is written.
pub fn seed_demo_source(source_dir: &Path) -> ArchivistResult<Option<Vec<PathBuf>>> {
    if source_dir.exists() {
        return Ok(None);
    }

    fs::create_dir_all(source_dir).map_err(|e| {
        ArchivistError::Io(format!(
            "Failed to create source directory {}: {}",
            source_dir.display(),
            e
        ))
    })?;

    let mut created = Vec::with_capacity(DEMO_FILES.len());
    for (name, contents) in DEMO_FILES {
        let path = source_dir.join(name);
        fs::write(&path, contents)
            .map_err(|e| ArchivistError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        created.push(path);
    }

    info!(dir = %source_dir.display(), files = created.len(), "seeded demo source");
    Ok(Some(created))
}
