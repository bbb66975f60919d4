//! Day-boundary truncation.
//!
//! Window comparisons (`started_between`, `ended_between`) widen the window
//! to whole days: `from` is truncated to midnight and `to` is pushed to the
//! last microsecond of its day. Both helpers work on the UTC calendar day.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Midnight (00:00:00.000000) of the UTC day containing `instant`.
#[must_use]
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Last representable microsecond (23:59:59.999999) of the UTC day
/// containing `instant`.
#[must_use]
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant)
        .checked_add_signed(Duration::days(1) - Duration::microseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn start_of_day_drops_time_component() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 17, 45, 12).unwrap();
        assert_eq!(start_of_day(t), Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn end_of_day_is_last_microsecond() {
        let t = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let end = end_of_day(t);

        assert_eq!(end.date_naive(), t.date_naive());
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.nanosecond(), 999_999_000);
    }

    #[test]
    fn truncation_is_idempotent() {
        let t = Utc.with_ymd_and_hms(2024, 7, 4, 9, 0, 0).unwrap();
        assert_eq!(start_of_day(start_of_day(t)), start_of_day(t));
        assert_eq!(end_of_day(end_of_day(t)), end_of_day(t));
    }
}
