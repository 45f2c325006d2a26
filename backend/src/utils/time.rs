use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Interprets a calendar date as the start of that day in the configured
/// timezone, returned as UTC. Used when admin date filters arrive without
/// a time component.
pub fn start_of_day_utc(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Interprets a calendar date as the end of that day (inclusive) in the
/// configured timezone, returned as UTC.
pub fn end_of_day_utc(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(23, 59, 59)?;
    tz.from_local_datetime(&local)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_in_timezone_returns_datetime_in_tz() {
        let tz = chrono_tz::UTC;
        let result = now_in_timezone(&tz);
        assert_eq!(result.timezone(), tz);
    }

    #[test]
    fn day_bounds_respect_offset() {
        let tz: Tz = "Asia/Kolkata".parse().expect("tz");
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).expect("date");

        let start = start_of_day_utc(&tz, date).expect("start");
        let end = end_of_day_utc(&tz, date).expect("end");

        // IST is UTC+5:30, so local midnight is 18:30 UTC the previous day.
        assert_eq!(start.to_rfc3339(), "2025-03-09T18:30:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-10T18:29:59+00:00");
        assert!(start < end);
    }

    #[test]
    fn utc_day_bounds_are_identity() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("date");
        let start = start_of_day_utc(&chrono_tz::UTC, date).expect("start");
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
