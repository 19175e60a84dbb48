//! Backup CLI commands
//!
//! Implements CLI commands for backup management.

use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::settings::Settings;
use crate::display::{
    format_archive_contents, format_archive_list, format_backup_outcome, format_size,
    format_sweep_report,
};
use crate::error::ArchivistResult;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Archive the source directory now
    Create {
        /// Skip the retention sweep that normally follows a backup
        #[arg(long)]
        no_sweep: bool,
    },

    /// List all archives in the archive directory
    List,

    /// Show the files inside an archive
    Info {
        /// Archive filename, path, list number, or 'latest'
        backup: String,
    },

    /// Delete archives older than the retention threshold
    Sweep {
        /// Only show what would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract an archive
    Restore {
        /// Archive filename, path, list number, or 'latest'
        backup: String,

        /// Destination directory (defaults to the configured restore directory)
        #[arg(short, long)]
        to: Option<PathBuf>,
    },

    /// Delete the archive directory and every archive in it
    Purge {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(settings: &Settings, cmd: BackupCommands) -> ArchivistResult<()> {
    let manager = BackupManager::new(settings.clone());

    match cmd {
        BackupCommands::Create { no_sweep } => {
            let writer = manager.writer();
            let file_count = writer.count_files()?;
            println!(
                "Found {} file(s) in '{}'",
                file_count,
                writer.source_dir().display()
            );

            let outcome = manager.create_backup_with(settings.sweep_after_backup && !no_sweep)?;
            print!("{}", format_backup_outcome(&outcome));
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;
            println!("{}", format_archive_list(&backups));
            if backups.is_empty() {
                println!("Create one with: archivist backup create");
            }
        }

        BackupCommands::Info { backup } => {
            let path = manager.resolve_backup(&backup)?;
            let size = std::fs::metadata(&path)?.len();
            let contents = RestoreManager::new(&settings.restore_dir).inspect(&path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", path.display());
            println!("Size: {}", format_size(size));
            println!();
            print!("{}", format_archive_contents(&contents));
        }

        BackupCommands::Sweep { dry_run } => {
            let sweeper = manager.sweeper();

            if dry_run {
                let planned = sweeper.plan_at(Local::now().naive_local())?;
                if planned.is_empty() {
                    println!(
                        "No backups older than {} day(s).",
                        sweeper.retention_days()
                    );
                }
                for archive in &planned {
                    println!(
                        "  Would delete: {} ({} days)",
                        archive.filename, archive.age_days
                    );
                }
                return Ok(());
            }

            let report = sweeper.sweep()?;
            if report.deleted_count() == 0 && !report.has_failures() {
                println!(
                    "No backups older than {} day(s).",
                    sweeper.retention_days()
                );
            } else {
                print!("{}", format_sweep_report(&report));
            }
        }

        BackupCommands::Restore { backup, to } => {
            let path = manager.resolve_backup(&backup)?;
            let restore_manager = RestoreManager::new(&settings.restore_dir);
            let result = restore_manager.restore(&path, to.as_deref())?;
            println!("{}", result.summary());
        }

        BackupCommands::Purge { force } => {
            if !force {
                let count = manager.list_backups()?.len();
                println!(
                    "This will delete '{}' and all {} backup(s) in it.",
                    manager.archive_dir().display(),
                    count
                );
                println!("To proceed, run again with --force flag:");
                println!("  archivist backup purge --force");
                return Ok(());
            }

            if manager.purge_backups()? {
                println!("All backups deleted.");
            } else {
                println!("Backup directory does not exist.");
            }
        }
    }

    Ok(())
}
