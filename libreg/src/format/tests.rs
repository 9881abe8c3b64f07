use super::*;
use chrono::TimeZone;

#[test]
fn test_format_size_bytes() {
    assert_eq!(format_size(65), "65 B");
}

#[test]
fn test_format_size_binary() {
    let size = 1024 * 5; // 5 KiB
    assert_eq!(format_size(size), "5 KiB");
}

#[test]
fn test_format_size_megabytes() {
    let size = 1024 * 1024 * 2; // 2 MiB
    assert_eq!(format_size(size), "2 MiB");
}

#[test]
fn test_format_size_uses_binary_units() {
    // 1000 bytes is below one KiB
    assert_eq!(format_size(1000), "1000 B");
}

#[test]
fn test_format_rfc3339_uses_z_suffix() {
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(format_rfc3339(&timestamp), "2024-01-02T03:04:05Z");
}

#[test]
fn test_format_rfc3339_drops_subseconds() {
    let timestamp = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
        + chrono::Duration::milliseconds(250);
    assert_eq!(format_rfc3339(&timestamp), "2023-12-31T23:59:59Z");
}
