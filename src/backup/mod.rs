//! Backup system for Archivist
//!
//! Archives a source directory into timestamped ZIP files and applies an
//! age-based retention policy to the archive directory.
//!
//! # Architecture
//!
//! - `ArchiveWriter`: walks the source and writes one deflate ZIP per run
//! - `RetentionSweeper`: deletes archives older than the retention threshold
//! - `BackupManager`: binds both to [`Settings`](crate::config::Settings),
//!   lists and resolves archives, and deletes the archive directory
//! - `RestoreManager`: extracts or inspects an archive
//!
//! # Archive Format
//!
//! Archives are named `backup_YYYYMMDD_HHMMSS.zip` (local time). Entries are
//! the source's files with paths relative to the source root.
//!
//! # Example
//!
//! ```rust,ignore
//! use archivist::backup::{BackupManager, RestoreManager};
//! use archivist::config::Settings;
//!
//! let manager = BackupManager::new(Settings::default());
//! let outcome = manager.create_backup()?;
//!
//! let restore = RestoreManager::new("restored_data");
//! restore.restore(&outcome.backup.path, None)?;
//! ```

mod manager;
pub mod naming;
mod restore;
mod retention;
mod seed;
mod writer;

pub use manager::{list_archives, ArchiveEntry, BackupManager, BackupOutcome, SweepStatus};
pub use restore::{ArchiveContents, ContentEntry, RestoreManager, RestoreResult};
pub use retention::{
    age_in_days, is_expired, RetentionSweeper, SweepFailure, SweepReport, SweptArchive,
};
pub use seed::{seed_demo_source, DEMO_FILES};
pub use writer::{ArchiveWriter, BackupReport, SourceFile};
