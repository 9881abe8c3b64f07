//! Human-readable data formatting utilities.

use chrono::{DateTime, SecondsFormat, Utc};
use humansize::{BINARY, format_size as format_size_human};

#[cfg(test)]
mod tests;

/// Formats a byte size into a human-readable string using binary units (KiB, MiB).
///
/// # Examples
///
/// ```
/// use libreg::format::format_size;
///
/// let size = 1024 * 1024 * 5; // 5 MiB
/// assert_eq!(format_size(size), "5 MiB");
///
/// let size = 1024; // 1 KiB
/// assert_eq!(format_size(size), "1 KiB");
/// ```
pub fn format_size(size_bytes: u64) -> String {
    format_size_human(size_bytes, BINARY)
}

/// Formats a timestamp as RFC 3339 in UTC with second precision (`2024-01-02T03:04:05Z`).
pub fn format_rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
