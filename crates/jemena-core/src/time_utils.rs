use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{JemenaError, Result};

/// Seconds in a calendar day (DST is ignored: timestamps are naive local time).
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Date layouts accepted in the `DATE` column and in configuration.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];

// ── Date parsing ──────────────────────────────────────────────────────────────

/// Parse a calendar date in any of the accepted layouts.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| JemenaError::InvalidDate(trimmed.to_string()))
}

// ── Chart axis coordinates ────────────────────────────────────────────────────

/// Fractional days since 1970-01-01 for a naive timestamp.
///
/// Chart x-coordinates for date axes use this scale so that daily and
/// half-hourly series share one convention.
pub fn datetime_to_day_number(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

/// Day number of midnight on `date`.
pub fn date_to_day_number(date: NaiveDate) -> f64 {
    datetime_to_day_number(date.and_time(NaiveTime::MIN))
}

/// Inverse of [`datetime_to_day_number`], rounded to the nearest second.
///
/// Returns `None` when `x` is outside chrono's representable range.
pub fn day_number_to_datetime(x: f64) -> Option<NaiveDateTime> {
    if !x.is_finite() {
        return None;
    }
    let secs = (x * SECONDS_PER_DAY).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Hours since midnight as a fraction, e.g. 13:30 → 13.5.
pub fn hour_of_day(t: NaiveTime) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0 + f64::from(t.second()) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_date_day_first() {
        assert_eq!(parse_date("15/01/2024").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_date_compact() {
        assert_eq!(parse_date(" 20240115 ").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("Jan 15").unwrap_err();
        assert!(matches!(err, JemenaError::InvalidDate(ref s) if s == "Jan 15"));
    }

    #[test]
    fn test_day_number_epoch() {
        assert_eq!(date_to_day_number(date(1970, 1, 1)), 0.0);
        assert_eq!(date_to_day_number(date(1970, 1, 11)), 10.0);
    }

    #[test]
    fn test_day_number_fraction() {
        let dt = date(1970, 1, 2).and_hms_opt(12, 0, 0).unwrap();
        assert!((datetime_to_day_number(dt) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_day_number_round_trip() {
        let dt = date(2024, 3, 9).and_hms_opt(17, 30, 0).unwrap();
        let x = datetime_to_day_number(dt);
        assert_eq!(day_number_to_datetime(x), Some(dt));
    }

    #[test]
    fn test_day_number_to_datetime_rejects_nan() {
        assert!(day_number_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_hour_of_day() {
        assert_eq!(hour_of_day(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), 0.0);
        assert_eq!(hour_of_day(NaiveTime::from_hms_opt(13, 30, 0).unwrap()), 13.5);
    }
}
