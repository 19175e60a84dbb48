//! Display formatting for terminal output
//!
//! Provides utilities for formatting archives, operation results and the
//! source directory for terminal display.

pub mod archive;
pub mod tree;

pub use archive::{
    format_archive_contents, format_archive_list, format_backup_outcome, format_size,
    format_sweep_report,
};
pub use tree::format_source_tree;
