//! Archivist - timestamped folder backups with age-based retention
//!
//! This library archives one source directory into `backup_YYYYMMDD_HHMMSS.zip`
//! files, lists and restores those archives, and deletes archives older than
//! a retention threshold.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `backup`: Archive writer, retention sweeper, listing and restore
//! - `display`: Terminal formatting
//! - `cli`: Subcommand handlers and the interactive menu
//!
//! # Example
//!
//! ```rust,ignore
//! use archivist::backup::BackupManager;
//! use archivist::config::{paths::ArchivistPaths, settings::Settings};
//!
//! let paths = ArchivistPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let outcome = BackupManager::new(settings).create_backup()?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;

pub use error::{ArchivistError, ArchivistResult};
