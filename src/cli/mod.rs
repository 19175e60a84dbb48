//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup layer.

pub mod backup;
pub mod menu;

pub use backup::{handle_backup_command, BackupCommands};
pub use menu::{Menu, MenuChoice, Prompter, StdinPrompter};
