//! Wall-clock values handed to the device's RTC and wake-up alarm.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};

/// Current Unix timestamp.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// The first instant of the day after `now`, in `now`'s timezone.
///
/// Midnights skipped by a DST jump resolve to one hour later; repeated
/// midnights resolve to the earlier instant.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tomorrow = now.date_naive().succ_opt()?.and_time(NaiveTime::MIN);
    let tz = now.timezone();
    match tz.from_local_datetime(&tomorrow) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(tomorrow + Duration::hours(1)))
            .earliest(),
    }
}

/// Unix timestamp of the next local midnight in `tz`.
pub fn next_alarm_timestamp(tz: chrono_tz::Tz) -> Option<i64> {
    next_midnight(&Utc::now().with_timezone(&tz)).map(|t| t.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Tz;

    fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn test_next_midnight_in_utc() {
        let now = at(Tz::UTC, 2024, 5, 1, 15, 30);
        let midnight = next_midnight(&now).unwrap();
        assert_eq!(midnight, at(Tz::UTC, 2024, 5, 2, 0, 0));
        assert_eq!(midnight.timestamp() - now.timestamp(), 8 * 3600 + 30 * 60);
    }

    #[test]
    fn test_next_midnight_respects_timezone() {
        let now = at(Tz::Asia__Tokyo, 2024, 12, 31, 23, 59);
        let midnight = next_midnight(&now).unwrap();
        assert_eq!(
            midnight.date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(midnight.timestamp() - now.timestamp(), 60);
    }

    #[test]
    fn test_next_midnight_skipped_by_dst() {
        // Santiago jumped from 00:00 to 01:00 on 2024-09-08
        let now = at(Tz::America__Santiago, 2024, 9, 7, 12, 0);
        let alarm = next_midnight(&now).unwrap();
        assert_eq!(alarm.date_naive(), NaiveDate::from_ymd_opt(2024, 9, 8).unwrap());
        assert_eq!(alarm.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn test_alarm_is_in_the_future() {
        let alarm = next_alarm_timestamp(Tz::Europe__Berlin).unwrap();
        let now = now_timestamp();
        assert!(alarm > now);
        assert!(alarm - now <= 25 * 3600);
    }
}
