//! Archive display formatting
//!
//! Formats archive listings and operation results for terminal output.

use crate::backup::{ArchiveContents, ArchiveEntry, BackupOutcome, SweepReport, SweepStatus};

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format the archive listing as a numbered table
pub fn format_archive_list(archives: &[ArchiveEntry]) -> String {
    if archives.is_empty() {
        return "No backups found.".to_string();
    }

    let name_width = archives
        .iter()
        .map(|a| a.filename.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>3}  {:<name_width$}  {:>10}  {}\n",
        "#",
        "Name",
        "Size",
        "Modified",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->3}  {:-<name_width$}  {:->10}  {:-<16}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for (i, archive) in archives.iter().enumerate() {
        let modified = archive
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        output.push_str(&format!(
            "{:>3}  {:<name_width$}  {:>10}  {}\n",
            i + 1,
            archive.filename,
            format_size(archive.size_bytes),
            modified,
            name_width = name_width,
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} backup(s)\n", archives.len()));
    output
}

/// Format the result of a backup and its follow-up sweep
pub fn format_backup_outcome(outcome: &BackupOutcome) -> String {
    let backup = &outcome.backup;

    let mut output = String::new();
    output.push_str(&format!("Backup created: {}\n", backup.filename));
    output.push_str(&format!("  Files:    {}\n", backup.file_count));
    output.push_str(&format!("  Size:     {}\n", format_size(backup.size_bytes)));
    output.push_str(&format!("  Location: {}\n", backup.path.display()));

    match &outcome.sweep {
        SweepStatus::Skipped => {}
        SweepStatus::Completed(report) => output.push_str(&format_sweep_report(report)),
        SweepStatus::Failed(reason) => {
            output.push_str(&format!("Retention sweep failed: {}\n", reason));
        }
    }

    output
}

/// Format a sweep report
///
/// Prints nothing for a sweep that neither deleted nor failed anything.
pub fn format_sweep_report(report: &SweepReport) -> String {
    let mut output = String::new();

    for archive in &report.deleted {
        output.push_str(&format!(
            "  Deleted old backup: {} ({} days)\n",
            archive.filename, archive.age_days
        ));
    }
    for failure in &report.failures {
        output.push_str(&format!(
            "  Could not delete {}: {}\n",
            failure.path.display(),
            failure.reason
        ));
    }
    if report.deleted_count() > 0 {
        output.push_str(&format!(
            "{} old backup(s) deleted\n",
            report.deleted_count()
        ));
    }

    output
}

/// Format an archive's table of contents
pub fn format_archive_contents(contents: &ArchiveContents) -> String {
    if contents.entries.is_empty() {
        return "Archive is empty.\n".to_string();
    }

    let mut output = String::new();
    for entry in &contents.entries {
        output.push_str(&format!(
            "  {} ({})\n",
            entry.name,
            format_size(entry.size_bytes)
        ));
    }
    output.push_str(&format!(
        "Total: {} file(s), {}\n",
        contents.entries.len(),
        format_size(contents.total_bytes())
    ));
    output
}
