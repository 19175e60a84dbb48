//! Configuration module for Archivist
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution for the settings file
//! - Settings persistence with command-line overrides

pub mod paths;
pub mod settings;

pub use paths::ArchivistPaths;
pub use settings::{Settings, SettingsOverrides};
