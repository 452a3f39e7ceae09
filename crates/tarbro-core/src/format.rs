//! Display formatting for member metadata.

use chrono::{DateTime, Utc};

const DECIMAL_UNITS: [(u128, &str); 8] = [
    (1_000_000_000_000_000_000_000_000, "YB"),
    (1_000_000_000_000_000_000_000, "ZB"),
    (1_000_000_000_000_000_000, "EB"),
    (1_000_000_000_000_000, "PB"),
    (1_000_000_000_000, "TB"),
    (1_000_000_000, "GB"),
    (1_000_000, "MB"),
    (1_000, "KB"),
];

/// Format a byte count with decimal units, e.g. `"120 bytes"` or `"1.5 KB"`.
pub fn format_size(bytes: u64) -> String {
    for (divider, symbol) in DECIMAL_UNITS.iter().copied() {
        if u128::from(bytes) >= divider {
            let value = bytes as f64 / divider as f64;
            return format!("{} {}", round_number(value), symbol);
        }
    }
    match bytes {
        1 => "1 byte".to_string(),
        n => format!("{} bytes", n),
    }
}

/// Two decimals, trailing zeros and dot removed.
fn round_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM` in UTC.
pub fn format_mtime(unix_secs: u64) -> String {
    let secs = i64::try_from(unix_secs).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_small_sizes() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(1), "1 byte");
        assert_eq!(format_size(120), "120 bytes");
        assert_eq!(format_size(999), "999 bytes");
    }

    #[test]
    fn test_format_decimal_units() {
        assert_eq!(format_size(1_000), "1 KB");
        assert_eq!(format_size(1_500), "1.5 KB");
        assert_eq!(format_size(1_234_567), "1.23 MB");
        assert_eq!(format_size(2_000_000), "2 MB");
        assert_eq!(format_size(5_000_000_000), "5 GB");
    }

    #[test]
    fn test_format_mtime() {
        assert_eq!(format_mtime(0), "1970-01-01 00:00");
        assert_eq!(format_mtime(1_700_000_000), "2023-11-14 22:13");
    }
}
