//! Archive filename format
//!
//! Archives are named `backup_YYYYMMDD_HHMMSS.zip` using local time. The
//! same fixed-width pattern is used to generate names and to recover the
//! creation time during retention sweeps, so archives written by earlier
//! runs stay readable.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Prefix shared by every archive filename
pub const ARCHIVE_PREFIX: &str = "backup_";

/// Extension of archive files, including the dot
pub const ARCHIVE_SUFFIX: &str = ".zip";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Length of `YYYYMMDD_HHMMSS`
const TIMESTAMP_LEN: usize = 15;

/// Build the archive filename for a creation time
pub fn archive_filename(timestamp: NaiveDateTime) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        timestamp.format(TIMESTAMP_FORMAT),
        ARCHIVE_SUFFIX
    )
}

/// Whether a filename looks like a ZIP archive (used by the lister)
pub fn has_archive_suffix(filename: &str) -> bool {
    filename.ends_with(ARCHIVE_SUFFIX)
}

/// Parse the creation time embedded in an archive filename
///
/// Returns `None` for anything that does not match the pattern exactly:
/// wrong prefix or suffix, wrong length, non-digits, a missing `_`
/// separator, or a date/time that does not exist on the calendar.
pub fn parse_archive_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let stamp = filename
        .strip_prefix(ARCHIVE_PREFIX)?
        .strip_suffix(ARCHIVE_SUFFIX)?;

    let bytes = stamp.as_bytes();
    if bytes.len() != TIMESTAMP_LEN || bytes[8] != b'_' {
        return None;
    }
    let all_digits = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 8 || b.is_ascii_digit());
    if !all_digits {
        return None;
    }

    // Only ASCII digits remain, so byte slicing is safe
    let year: i32 = stamp[0..4].parse().ok()?;
    let month: u32 = stamp[4..6].parse().ok()?;
    let day: u32 = stamp[6..8].parse().ok()?;
    let hour: u32 = stamp[9..11].parse().ok()?;
    let minute: u32 = stamp[11..13].parse().ok()?;
    let second: u32 = stamp[13..15].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    Some(NaiveDateTime::new(date, time))
}
