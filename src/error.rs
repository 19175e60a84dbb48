//! Custom error types for Archivist
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Archivist operations
#[derive(Error, Debug)]
pub enum ArchivistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// ZIP reading or writing errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The directory to back up is missing
    #[error("Source directory not found: {0}")]
    SourceNotFound(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },
}

impl ArchivistError {
    /// Create a "not found" error for archives
    pub fn archive_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SourceNotFound(_))
    }
}

impl From<std::io::Error> for ArchivistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ArchivistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchivistError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<walkdir::Error> for ArchivistError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for Archivist operations
pub type ArchivistResult<T> = Result<T, ArchivistError>;
