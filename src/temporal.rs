//! Timestamp decoding for the two layouts BMKG publishes
//!
//! Forecast documents stamp every timerange with a compact `YYYYMMDDHHmm`
//! string in provider-local time. The seismic feed uses an ISO-8601 layout
//! with an explicit offset. Each layout is parsed as its own literal format.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

use crate::{BmkgError, Result};

/// Width of a forecast timestamp: `YYYYMMDDHHmm`
pub const FORECAST_TIMESTAMP_LEN: usize = 12;

/// Layout of the seismic feed `DateTime` field, e.g. `2026-10-17T05:12:44+00:00`
pub const SEISMIC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Layout of the forecast issue timestamp, e.g. `20261017060000`
pub const ISSUE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse a forecast timerange stamp (`YYYYMMDDHHmm`) into a naive local timestamp.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    if raw.len() != FORECAST_TIMESTAMP_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BmkgError::format("timestamp", raw));
    }

    // All bytes are ASCII digits, so byte slicing is on char boundaries.
    let field = |range: std::ops::Range<usize>| -> Result<u32> {
        raw[range]
            .parse::<u32>()
            .map_err(|_| BmkgError::format("timestamp", raw))
    };

    let year = i32::try_from(field(0..4)?).map_err(|_| BmkgError::format("timestamp", raw))?;
    let month = field(4..6)?;
    let day = field(6..8)?;
    let hour = field(8..10)?;
    let minute = field(10..12)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| BmkgError::format("timestamp", raw))
}

/// Parse the seismic feed `DateTime` field, keeping its published offset.
pub fn parse_seismic_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw.trim(), SEISMIC_TIMESTAMP_FORMAT)
        .map_err(|_| BmkgError::format("DateTime", raw))
}

/// Parse the forecast document issue stamp (`YYYYMMDDHHmmss`).
pub fn parse_issue_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), ISSUE_TIMESTAMP_FORMAT)
        .map_err(|_| BmkgError::format("issue.timestamp", raw))
}

/// Whether a timestamp falls at or after noon, which selects the `pm` icon.
#[must_use]
pub fn is_evening(timestamp: &NaiveDateTime) -> bool {
    timestamp.hour() >= 12
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rstest::rstest;

    #[rstest]
    #[case("202610170900", 2026, 10, 17, 9, 0)]
    #[case("202101010000", 2021, 1, 1, 0, 0)]
    #[case("199912312359", 1999, 12, 31, 23, 59)]
    #[case("202402291830", 2024, 2, 29, 18, 30)]
    fn test_parse_timestamp_fields(
        #[case] raw: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
    ) {
        let ts = parse_timestamp(raw).unwrap();
        assert_eq!(ts.year(), year);
        assert_eq!(ts.month(), month);
        assert_eq!(ts.day(), day);
        assert_eq!(ts.hour(), hour);
        assert_eq!(ts.minute(), minute);
    }

    #[rstest]
    #[case("")]
    #[case("20261017090")]
    #[case("2026101709000")]
    #[case("2026-10-1709")]
    #[case("20261017090a")]
    #[case("202613170900")]
    #[case("202302290900")]
    #[case("202610172500")]
    #[case("+02610170900")]
    fn test_parse_timestamp_rejects_malformed(#[case] raw: &str) {
        let err = parse_timestamp(raw).unwrap_err();
        assert!(matches!(err, BmkgError::Format { .. }));
    }

    #[test]
    fn test_parse_seismic_timestamp() {
        let ts = parse_seismic_timestamp("2026-10-17T05:12:44+00:00").unwrap();
        assert_eq!(ts.year(), 2026);
        assert_eq!(ts.hour(), 5);
        assert_eq!(ts.minute(), 12);
        assert_eq!(ts.second(), 44);
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_seismic_layout_is_not_the_forecast_layout() {
        assert!(parse_seismic_timestamp("202610170512").is_err());
        assert!(parse_timestamp("2026-10-17T05:12:44+00:00").is_err());
    }

    #[test]
    fn test_parse_issue_timestamp() {
        let ts = parse_issue_timestamp("20261017060413").unwrap();
        assert_eq!(ts.day(), 17);
        assert_eq!(ts.second(), 13);
        assert!(parse_issue_timestamp("2026101706").is_err());
    }

    #[test]
    fn test_is_evening_boundary() {
        assert!(!is_evening(&parse_timestamp("202610171159").unwrap()));
        assert!(is_evening(&parse_timestamp("202610171200").unwrap()));
        assert!(!is_evening(&parse_timestamp("202610170900").unwrap()));
        assert!(is_evening(&parse_timestamp("202610171500").unwrap()));
    }
}
