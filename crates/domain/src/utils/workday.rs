//! The 30-hour workday clock.
//!
//! Business days run 06:00–29:59 local time: hours 00:00–05:59 are relabeled
//! 24:00–29:59 and attributed to the *previous* calendar day. These functions
//! are the canonical source of `event_date` and of time-of-day positions used
//! by bucketing; both sides must go through here so the semantics stay
//! consistent.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};

use crate::constants::WORKDAY_START_HOUR;

/// Workday a given instant belongs to.
///
/// Converts to the local offset; local hours before 06:00 count toward the
/// previous calendar day. Pure and idempotent: the same timestamp always
/// yields the same date.
pub fn workday_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let local = timestamp.with_timezone(&offset);
    if local.hour() < WORKDAY_START_HOUR {
        (local - Duration::hours(i64::from(WORKDAY_START_HOUR))).date_naive()
    } else {
        local.date_naive()
    }
}

/// Minutes since midnight on the 30-hour scale (0..1800).
///
/// Local hours 0–5 are re-expressed as 24–29, never as 0–5, so arithmetic
/// against same-workday evening times stays monotonic.
pub fn workday_minutes(timestamp: DateTime<Utc>, offset: FixedOffset) -> u32 {
    let local = timestamp.with_timezone(&offset);
    let hour = if local.hour() < WORKDAY_START_HOUR { local.hour() + 24 } else { local.hour() };
    hour * 60 + local.minute()
}

/// Format minutes on the 30-hour scale as `HH:MM` (hour range 00..29).
pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn daytime_event_keeps_local_date() {
        // 01:30 UTC is 10:30 JST
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 1, 30, 0).unwrap();
        assert_eq!(workday_date(ts, jst()), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(workday_minutes(ts, jst()), 10 * 60 + 30);
    }

    #[test]
    fn early_morning_event_belongs_to_previous_workday() {
        // 18:30 UTC on the 15th is 03:30 JST on the 16th, which is 27:30 of
        // the 15th on the 30-hour clock.
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 18, 30, 0).unwrap();
        assert_eq!(workday_date(ts, jst()), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(workday_minutes(ts, jst()), 27 * 60 + 30);
    }

    #[test]
    fn boundary_hours_split_at_six() {
        let before_six = Utc.with_ymd_and_hms(2025, 1, 15, 20, 59, 0).unwrap(); // 05:59 JST 16th
        let at_six = Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(); // 06:00 JST 16th

        assert_eq!(
            workday_date(before_six, jst()),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert_eq!(workday_minutes(before_six, jst()), 29 * 60 + 59);

        assert_eq!(workday_date(at_six, jst()), NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
        assert_eq!(workday_minutes(at_six, jst()), 6 * 60);
    }

    #[test]
    fn derivation_is_idempotent() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 2, 17, 45, 12).unwrap();
        let first = workday_date(ts, jst());
        for _ in 0..10 {
            assert_eq!(workday_date(ts, jst()), first);
        }
    }

    #[test]
    fn early_hours_match_minus_six_rule() {
        // For every local hour h < 6, the derived date equals the calendar
        // date of (timestamp - 6h) in local time.
        for hour in 0..6 {
            let utc_hour = (hour + 24 - 9) % 24; // local JST hour -> UTC hour of previous day
            let ts = Utc.with_ymd_and_hms(2025, 6, 9, utc_hour, 10, 0).unwrap();
            let local = ts.with_timezone(&jst());
            assert_eq!(local.hour(), hour);
            let expected = (local - Duration::hours(6)).date_naive();
            assert_eq!(workday_date(ts, jst()), expected);
            assert_eq!(workday_minutes(ts, jst()), (hour + 24) * 60 + 10);
        }
    }

    #[test]
    fn formats_thirty_hour_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(6 * 60), "06:00");
        assert_eq!(format_clock(29 * 60 + 59), "29:59");
    }
}
