//! Source directory tree

use std::fmt::Write as _;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::ArchivistResult;

use super::archive::format_size;

/// Render the source directory as an indented tree with file sizes
pub fn format_source_tree(source_dir: &Path) -> ArchivistResult<String> {
    if !source_dir.is_dir() {
        return Ok(format!(
            "Source directory '{}' does not exist.\n",
            source_dir.display()
        ));
    }

    let mut output = String::new();
    let mut file_count = 0usize;
    let mut total_bytes = 0u64;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        let indent = "  ".repeat(entry.depth());

        if entry.depth() == 0 {
            let _ = writeln!(output, "{}/", source_dir.display());
        } else if entry.file_type().is_dir() {
            let _ = writeln!(output, "{}{}/", indent, entry.file_name().to_string_lossy());
        } else {
            let size = entry.metadata()?.len();
            file_count += 1;
            total_bytes += size;
            let _ = writeln!(
                output,
                "{}{} ({})",
                indent,
                entry.file_name().to_string_lossy(),
                format_size(size)
            );
        }
    }

    let _ = writeln!(
        output,
        "Total: {} file(s), {}",
        file_count,
        format_size(total_bytes)
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let output = format_source_tree(&temp.path().join("missing")).unwrap();
        assert!(output.contains("does not exist"));
    }

    #[test]
    fn test_tree_layout() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("a.txt"), "hello").unwrap();
        fs::write(source.join("nested").join("b.txt"), vec![0u8; 2048]).unwrap();

        let output = format_source_tree(&source).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[1], "  a.txt (5 B)");
        assert_eq!(lines[2], "  nested/");
        assert_eq!(lines[3], "    b.txt (2.0 KB)");
        assert_eq!(lines[4], "Total: 2 file(s), 2.0 KB");
    }
}
