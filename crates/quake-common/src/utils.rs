//! Date, time and number formatting helpers.

use crate::error::{QuakeError, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Calendar date format accepted from users and used in formatted times.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format of [`crate::DisplayEvent::formatted_time`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder shown when a timestamp cannot be represented.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Converts epoch milliseconds into a date-time in `tz`.
pub fn datetime_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(tz))
}

/// Formats epoch milliseconds as `yyyy-MM-dd HH:mm:ss` in `tz`.
pub fn format_timestamp_in<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    datetime_in(millis, tz)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Calendar day of epoch milliseconds in `tz`.
pub fn local_date_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<NaiveDate> {
    datetime_in(millis, tz).map(|dt| dt.date_naive())
}

/// Today's date on the system clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Checks that `input` is exactly `yyyy-MM-dd` and names a real calendar day.
pub fn is_valid_date_format(input: &str) -> bool {
    parse_date(input).is_ok()
}

/// Parses a strict `yyyy-MM-dd` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return Err(QuakeError::validation_field(
            format!("'{input}' is not in yyyy-MM-dd format"),
            "date",
        ));
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| {
        QuakeError::validation_field(format!("'{input}' is not a calendar date"), "date")
    })
}

/// Validates a user supplied range start: strict format, strictly after `baseline`.
pub fn validate_range_start(input: &str, baseline: NaiveDate) -> Result<NaiveDate> {
    let date = parse_date(input.trim())?;
    if date <= baseline {
        return Err(QuakeError::validation_field(
            format!("Date must be after {}", baseline.format(DATE_FORMAT)),
            "date",
        ));
    }
    Ok(date)
}

/// Renders a magnitude with at least one decimal place (`0.0`, `5.0`, `4.25`).
pub fn format_magnitude(magnitude: f64) -> String {
    if magnitude.is_finite() && magnitude.fract() == 0.0 {
        format!("{magnitude:.1}")
    } else {
        magnitude.to_string()
    }
}

/// Truncates a string to a maximum number of characters with ellipsis.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_timestamp_in_utc() {
        // 2023-11-22T14:00:00Z
        assert_eq!(
            format_timestamp_in(1_700_661_600_000, &Utc),
            "2023-11-22 14:00:00"
        );
    }

    #[test]
    fn test_format_timestamp_in_offset_zone() {
        let zurich = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_timestamp_in(1_700_661_600_000, &zurich),
            "2023-11-22 15:00:00"
        );
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp_in(i64::MAX, &Utc), UNKNOWN_TIME);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2023-11-22T20:00:00Z is already the 23rd in Tokyo
        let millis = 1_700_683_200_000;
        assert_eq!(
            local_date_in(millis, &Utc),
            NaiveDate::from_ymd_opt(2023, 11, 22)
        );
        assert_eq!(
            local_date_in(millis, &tokyo),
            NaiveDate::from_ymd_opt(2023, 11, 23)
        );
    }

    #[test]
    fn test_is_valid_date_format() {
        assert!(is_valid_date_format("2023-11-22"));
        assert!(!is_valid_date_format("2023/11/22"));
        assert!(!is_valid_date_format("2023-13-01"));
        assert!(!is_valid_date_format("2023-02-30"));
        assert!(!is_valid_date_format("2023-1-05"));
        assert!(!is_valid_date_format("yyyy-MM-dd"));
        assert!(!is_valid_date_format(""));
    }

    #[test]
    fn test_validate_range_start() {
        let baseline = NaiveDate::from_ymd_opt(2023, 11, 22).unwrap();
        assert_eq!(
            validate_range_start("2023-11-23", baseline).unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 23).unwrap()
        );
        assert!(validate_range_start("2023-11-22", baseline).is_err());
        assert!(validate_range_start("2023-11-01", baseline).is_err());
        assert!(validate_range_start("not a date", baseline).is_err());
    }

    #[test]
    fn test_format_magnitude() {
        assert_eq!(format_magnitude(0.0), "0.0");
        assert_eq!(format_magnitude(5.0), "5.0");
        assert_eq!(format_magnitude(4.25), "4.25");
        assert_eq!(format_magnitude(-0.5), "-0.5");
    }

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        assert_eq!(truncate_string(input, 20), "This is a very lo...");
        assert_eq!(truncate_string("Short", 20), "Short");
        assert_eq!(truncate_string("Zürich, Schweiz", 10), "Zürich,...");
    }
}
