//! Sunday-based schedule weeks.
//!
//! A schedule covers seven days starting on a Sunday. Dates cross the wire
//! as `YYYY-MM-DD`.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::DashboardError;

/// Wire format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accept `date` only if it is a Sunday.
pub fn ensure_week_start(date: NaiveDate) -> Result<NaiveDate, DashboardError> {
    match date.weekday() {
        Weekday::Sun => Ok(date),
        weekday => Err(DashboardError::NotSunday { date, weekday }),
    }
}

/// The Sunday on or before `today`.
pub fn current_week_start(today: NaiveDate) -> NaiveDate {
    let offset = u64::from(today.weekday().num_days_from_sunday());
    today.checked_sub_days(Days::new(offset)).unwrap_or(today)
}

/// The Sunday starting the current local week.
pub fn this_week_start() -> NaiveDate {
    current_week_start(Local::now().date_naive())
}

/// Move `start` by `weeks` whole weeks. `None` if the result is out of range.
pub fn shift_weeks(start: NaiveDate, weeks: i64) -> Option<NaiveDate> {
    let days = Days::new(weeks.unsigned_abs().checked_mul(7)?);
    if weeks >= 0 {
        start.checked_add_days(days)
    } else {
        start.checked_sub_days(days)
    }
}

/// The seven dates of the week starting at `start`.
pub fn week_days(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(7)
}

/// The Saturday closing the week starting at `start`.
pub fn week_end(start: NaiveDate) -> NaiveDate {
    week_days(start).last().unwrap_or(start)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_sunday_accepted() {
        assert_eq!(
            ensure_week_start(date("2024-05-05")).unwrap(),
            date("2024-05-05")
        );
    }

    #[test_case("2024-05-06", Weekday::Mon ; "monday")]
    #[test_case("2024-05-10", Weekday::Fri ; "friday")]
    #[test_case("2024-05-11", Weekday::Sat ; "saturday")]
    fn test_non_sunday_rejected(s: &str, expected: Weekday) {
        match ensure_week_start(date(s)) {
            Err(DashboardError::NotSunday { weekday, .. }) => assert_eq!(weekday, expected),
            other => panic!("expected NotSunday, got {:?}", other),
        }
    }

    #[test_case("2024-05-05", "2024-05-05" ; "sunday is its own week start")]
    #[test_case("2024-05-08", "2024-05-05" ; "midweek")]
    #[test_case("2024-05-11", "2024-05-05" ; "saturday")]
    #[test_case("2024-03-02", "2024-02-25" ; "across a leap day")]
    fn test_current_week_start(today: &str, expected: &str) {
        assert_eq!(current_week_start(date(today)), date(expected));
    }

    #[test]
    fn test_shift_weeks() {
        let start = date("2024-05-05");
        assert_eq!(shift_weeks(start, 1), Some(date("2024-05-12")));
        assert_eq!(shift_weeks(start, -1), Some(date("2024-04-28")));
        assert_eq!(shift_weeks(start, 0), Some(start));
        assert_eq!(shift_weeks(start, i64::MAX), None);
    }

    #[test]
    fn test_week_days_and_end() {
        let start = date("2024-12-29");
        let days: Vec<_> = week_days(start).map(format_date).collect();
        assert_eq!(
            days,
            vec![
                "2024-12-29",
                "2024-12-30",
                "2024-12-31",
                "2025-01-01",
                "2025-01-02",
                "2025-01-03",
                "2025-01-04",
            ]
        );
        assert_eq!(week_end(start), date("2025-01-04"));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(format_date(date("2024-05-05")), "2024-05-05");
        assert!(parse_date("05/05/2024").is_err());
    }

    proptest! {
        #[test]
        fn prop_current_week_start_is_recent_sunday(days in 0i64..200_000) {
            let today = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
                + chrono::Days::new(days as u64);
            let start = current_week_start(today);

            prop_assert_eq!(start.weekday(), Weekday::Sun);
            prop_assert!(start <= today);
            prop_assert!((today - start).num_days() < 7);
            prop_assert!(ensure_week_start(start).is_ok());
        }

        #[test]
        fn prop_shift_preserves_sunday(days in 0u64..100_000, weeks in -500i64..500) {
            let start = current_week_start(
                NaiveDate::from_ymd_opt(1950, 1, 1).unwrap() + chrono::Days::new(days),
            );
            let shifted = shift_weeks(start, weeks).unwrap();
            prop_assert_eq!(shifted.weekday(), Weekday::Sun);
            prop_assert_eq!((shifted - start).num_days(), weeks * 7);
        }
    }
}
