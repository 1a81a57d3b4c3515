//! The date capability every grid, selection and focus computation is written
//! against.
//!
//! An implementation supplies the conversion between its own time
//! representation and chrono's civil (wall-clock) `NaiveDateTime`; the
//! calendar arithmetic is provided on top of that conversion and can be
//! overridden where a representation knows better.

use crate::CalendarError;
use crate::consts::{DAYS_PER_WEEK, FIRST_WEEK_CONTAINS_JAN_1, MONTHS_PER_YEAR};
use crate::types::DayOfWeek;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt::{self, Write};

/// Primitive date operations used by the calendar engine.
///
/// Day-granularity comparisons (`is_same_day`, the `difference_in_*`
/// family) look at the civil date only; `is_before` / `is_after` compare
/// instants.
pub trait DateCapability {
    /// The point-in-time value this capability works with.
    type Date: Clone + Ord + fmt::Debug;

    /// The current instant.
    fn now(&self) -> Self::Date;

    /// Wall-clock reading of `date` in this capability's time representation.
    fn to_civil(&self, date: &Self::Date) -> NaiveDateTime;

    /// The value whose wall-clock reading is `civil`.
    fn from_civil(&self, civil: NaiveDateTime) -> Self::Date;

    /// ISO-8601 timestamp of `date`.
    fn to_iso_string(&self, date: &Self::Date) -> String;

    /// Parses an ISO-8601 timestamp or calendar date.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the input is not a valid date.
    fn parse_iso(&self, input: &str) -> Result<Self::Date, CalendarError>;

    fn today(&self) -> Self::Date {
        self.start_of_day(&self.now())
    }

    /// Civil calendar date of `date`.
    fn calendar_date(&self, date: &Self::Date) -> NaiveDate {
        self.to_civil(date).date()
    }

    /// Start of the given civil day.
    fn from_calendar_date(&self, date: NaiveDate) -> Self::Date {
        self.from_civil(date.and_time(NaiveTime::MIN))
    }

    /// Adds whole days, keeping the time of day. Saturates at chrono's limits.
    fn add_days(&self, date: &Self::Date, amount: i64) -> Self::Date {
        let civil = self.to_civil(date);
        self.from_civil(shift_days(civil.date(), amount).and_time(civil.time()))
    }

    fn add_weeks(&self, date: &Self::Date, amount: i64) -> Self::Date {
        self.add_days(date, amount.saturating_mul(DAYS_PER_WEEK as i64))
    }

    /// Adds whole months, clamping the day to the target month's length.
    fn add_months(&self, date: &Self::Date, amount: i32) -> Self::Date {
        let civil = self.to_civil(date);
        self.from_civil(shift_months(civil.date(), amount).and_time(civil.time()))
    }

    fn add_years(&self, date: &Self::Date, amount: i32) -> Self::Date {
        self.add_months(date, amount.saturating_mul(MONTHS_PER_YEAR))
    }

    fn start_of_day(&self, date: &Self::Date) -> Self::Date {
        self.from_calendar_date(self.calendar_date(date))
    }

    fn start_of_week(&self, date: &Self::Date, week_starts_on: DayOfWeek) -> Self::Date {
        self.from_calendar_date(week_start(self.calendar_date(date), week_starts_on))
    }

    fn start_of_iso_week(&self, date: &Self::Date) -> Self::Date {
        self.start_of_week(date, DayOfWeek::MONDAY)
    }

    /// Monday of the week containing the first day of `date`'s month.
    fn start_of_broadcast_week(&self, date: &Self::Date) -> Self::Date {
        let first = first_of_month(self.calendar_date(date));
        self.from_calendar_date(week_start(first, DayOfWeek::MONDAY))
    }

    fn start_of_month(&self, date: &Self::Date) -> Self::Date {
        self.from_calendar_date(first_of_month(self.calendar_date(date)))
    }

    fn start_of_year(&self, date: &Self::Date) -> Self::Date {
        let civil = self.calendar_date(date);
        self.from_calendar_date(civil.with_ordinal(1).unwrap_or(civil))
    }

    fn end_of_week(&self, date: &Self::Date, week_starts_on: DayOfWeek) -> Self::Date {
        let start = week_start(self.calendar_date(date), week_starts_on);
        self.end_of_calendar_day(shift_days(start, DAYS_PER_WEEK as i64 - 1))
    }

    fn end_of_iso_week(&self, date: &Self::Date) -> Self::Date {
        self.end_of_week(date, DayOfWeek::MONDAY)
    }

    /// End of the last broadcast week of `date`'s month: the month's last Sunday.
    fn end_of_broadcast_week(&self, date: &Self::Date) -> Self::Date {
        let last = last_of_month(self.calendar_date(date));
        let back = i64::from(last.weekday().num_days_from_sunday());
        self.end_of_calendar_day(shift_days(last, -back))
    }

    fn end_of_month(&self, date: &Self::Date) -> Self::Date {
        self.end_of_calendar_day(last_of_month(self.calendar_date(date)))
    }

    fn end_of_year(&self, date: &Self::Date) -> Self::Date {
        let civil = self.calendar_date(date);
        let last = NaiveDate::from_ymd_opt(civil.year(), 12, 31).unwrap_or(civil);
        self.end_of_calendar_day(last)
    }

    /// Last representable instant of the given civil day.
    fn end_of_calendar_day(&self, date: NaiveDate) -> Self::Date {
        self.from_civil(date.and_time(last_instant()))
    }

    /// Number of calendar days from `right` to `left`, ignoring time of day.
    fn difference_in_calendar_days(&self, left: &Self::Date, right: &Self::Date) -> i64 {
        self.calendar_date(left)
            .signed_duration_since(self.calendar_date(right))
            .num_days()
    }

    /// Number of calendar months from `right` to `left`, ignoring days.
    fn difference_in_calendar_months(&self, left: &Self::Date, right: &Self::Date) -> i32 {
        month_index(self.calendar_date(left)) - month_index(self.calendar_date(right))
    }

    fn is_before(&self, date: &Self::Date, other: &Self::Date) -> bool {
        date < other
    }

    fn is_after(&self, date: &Self::Date, other: &Self::Date) -> bool {
        date > other
    }

    fn is_same_day(&self, left: &Self::Date, right: &Self::Date) -> bool {
        self.calendar_date(left) == self.calendar_date(right)
    }

    fn is_same_month(&self, left: &Self::Date, right: &Self::Date) -> bool {
        month_index(self.calendar_date(left)) == month_index(self.calendar_date(right))
    }

    fn is_same_year(&self, left: &Self::Date, right: &Self::Date) -> bool {
        self.calendar_date(left).year() == self.calendar_date(right).year()
    }

    fn day_of_week(&self, date: &Self::Date) -> DayOfWeek {
        DayOfWeek::from(self.calendar_date(date).weekday())
    }

    /// Locale week number: weeks start on `week_starts_on` and week 1 is
    /// the week containing January `first_week_contains_date`.
    fn get_week(
        &self,
        date: &Self::Date,
        week_starts_on: DayOfWeek,
        first_week_contains_date: u8,
    ) -> u32 {
        locale_week(self.calendar_date(date), week_starts_on, first_week_contains_date)
    }

    fn get_iso_week(&self, date: &Self::Date) -> u32 {
        self.calendar_date(date).iso_week().week()
    }

    /// Broadcast week number: Monday weeks, week 1 contains January 1st.
    fn get_broadcast_week(&self, date: &Self::Date) -> u32 {
        locale_week(
            self.calendar_date(date),
            DayOfWeek::MONDAY,
            FIRST_WEEK_CONTAINS_JAN_1,
        )
    }

    fn min(&self, dates: &[Self::Date]) -> Option<Self::Date> {
        dates.iter().min().cloned()
    }

    fn max(&self, dates: &[Self::Date]) -> Option<Self::Date> {
        dates.iter().max().cloned()
    }

    /// Formats the wall-clock reading of `date` with a chrono strftime pattern.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidFormat` if the pattern is rejected.
    fn format(&self, date: &Self::Date, pattern: &str) -> Result<String, CalendarError> {
        let mut out = String::new();
        write!(out, "{}", self.to_civil(date).format(pattern))
            .map_err(|_| CalendarError::InvalidFormat(pattern.to_owned()))?;
        Ok(out)
    }
}

// --- civil-date helpers shared by the provided methods ---

pub(crate) fn shift_days(date: NaiveDate, amount: i64) -> NaiveDate {
    let days = Days::new(amount.unsigned_abs());
    if amount >= 0 {
        date.checked_add_days(days).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
    }
}

pub(crate) fn shift_months(date: NaiveDate, amount: i32) -> NaiveDate {
    let months = Months::new(amount.unsigned_abs());
    if amount >= 0 {
        date.checked_add_months(months).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(months).unwrap_or(NaiveDate::MIN)
    }
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub(crate) fn last_of_month(date: NaiveDate) -> NaiveDate {
    shift_months(first_of_month(date), 1)
        .pred_opt()
        .unwrap_or(date)
}

pub(crate) fn week_start(date: NaiveDate, week_starts_on: DayOfWeek) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    let back = (weekday - i64::from(week_starts_on.get())).rem_euclid(DAYS_PER_WEEK as i64);
    shift_days(date, -back)
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * MONTHS_PER_YEAR + date.month0() as i32
}

fn last_instant() -> NaiveTime {
    // wraps around to 23:59:59.999
    NaiveTime::MIN - TimeDelta::milliseconds(1)
}

fn first_week_start(year: i32, week_starts_on: DayOfWeek, first_week_contains_date: u8) -> NaiveDate {
    let anchor = NaiveDate::from_ymd_opt(year, 1, u32::from(first_week_contains_date.clamp(1, 7)))
        .unwrap_or(NaiveDate::MIN);
    week_start(anchor, week_starts_on)
}

fn locale_week(date: NaiveDate, week_starts_on: DayOfWeek, first_week_contains_date: u8) -> u32 {
    let year = date.year();
    let next = first_week_start(year + 1, week_starts_on, first_week_contains_date);
    let this = first_week_start(year, week_starts_on, first_week_contains_date);
    let week_year_start = if date >= next {
        next
    } else if date >= this {
        this
    } else {
        first_week_start(year - 1, week_starts_on, first_week_contains_date)
    };
    let elapsed = week_start(date, week_starts_on)
        .signed_duration_since(week_year_start)
        .num_days();
    (elapsed / DAYS_PER_WEEK as i64) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NaiveCalendar;
    use crate::consts::FIRST_WEEK_CONTAINS_JAN_4;
    use crate::test_utils::{at, ymd};

    #[test]
    fn test_add_days_keeps_time_of_day() {
        let lib = NaiveCalendar::new();
        let date = at(2024, 1, 31, 15, 30);
        assert_eq!(lib.add_days(&date, 1), at(2024, 2, 1, 15, 30));
        assert_eq!(lib.add_days(&date, -31), at(2023, 12, 31, 15, 30));
        assert_eq!(lib.add_weeks(&date, 2), at(2024, 2, 14, 15, 30));
    }

    #[test]
    fn test_add_months_clamps_day() {
        let lib = NaiveCalendar::new();
        assert_eq!(lib.add_months(&ymd(2024, 1, 31), 1), ymd(2024, 2, 29));
        assert_eq!(lib.add_months(&ymd(2023, 1, 31), 1), ymd(2023, 2, 28));
        assert_eq!(lib.add_months(&ymd(2024, 3, 15), -3), ymd(2023, 12, 15));
        assert_eq!(lib.add_years(&ymd(2024, 2, 29), 1), ymd(2025, 2, 28));
    }

    #[test]
    fn test_week_boundaries() {
        let lib = NaiveCalendar::new();
        // 2024-05-15 is a Wednesday
        let date = at(2024, 5, 15, 10, 0);
        assert_eq!(lib.start_of_week(&date, DayOfWeek::SUNDAY), ymd(2024, 5, 12));
        assert_eq!(lib.start_of_iso_week(&date), ymd(2024, 5, 13));
        assert_eq!(
            lib.calendar_date(&lib.end_of_week(&date, DayOfWeek::SUNDAY)),
            NaiveDate::from_ymd_opt(2024, 5, 18).unwrap()
        );
        assert_eq!(
            lib.calendar_date(&lib.end_of_iso_week(&date)),
            NaiveDate::from_ymd_opt(2024, 5, 19).unwrap()
        );
        assert!(lib.is_same_day(&lib.end_of_iso_week(&date), &ymd(2024, 5, 19)));
    }

    #[test]
    fn test_month_and_year_boundaries() {
        let lib = NaiveCalendar::new();
        let date = at(2024, 2, 10, 8, 0);
        assert_eq!(lib.start_of_month(&date), ymd(2024, 2, 1));
        assert!(lib.is_same_day(&lib.end_of_month(&date), &ymd(2024, 2, 29)));
        assert_eq!(lib.start_of_year(&date), ymd(2024, 1, 1));
        assert!(lib.is_same_day(&lib.end_of_year(&date), &ymd(2024, 12, 31)));
        assert!(lib.end_of_month(&date) > ymd(2024, 2, 29));
    }

    #[test]
    fn test_broadcast_boundaries() {
        let lib = NaiveCalendar::new();
        // September 2024 starts on a Sunday; its broadcast month runs
        // from Monday 2024-08-26 to Sunday 2024-09-29.
        let date = ymd(2024, 9, 18);
        assert_eq!(lib.start_of_broadcast_week(&date), ymd(2024, 8, 26));
        assert!(lib.is_same_day(&lib.end_of_broadcast_week(&date), &ymd(2024, 9, 29)));

        // July 2024 starts on a Monday and ends on a Wednesday.
        let date = ymd(2024, 7, 4);
        assert_eq!(lib.start_of_broadcast_week(&date), ymd(2024, 7, 1));
        assert!(lib.is_same_day(&lib.end_of_broadcast_week(&date), &ymd(2024, 7, 28)));
    }

    #[test]
    fn test_differences() {
        let lib = NaiveCalendar::new();
        let late = at(2024, 3, 1, 0, 5);
        let early = at(2024, 2, 28, 23, 55);
        assert_eq!(lib.difference_in_calendar_days(&late, &early), 2);
        assert_eq!(lib.difference_in_calendar_days(&early, &late), -2);
        assert_eq!(lib.difference_in_calendar_months(&ymd(2025, 1, 1), &ymd(2024, 11, 30)), 2);
        assert_eq!(lib.difference_in_calendar_months(&ymd(2024, 11, 30), &ymd(2025, 1, 1)), -2);
    }

    #[test]
    fn test_comparisons() {
        let lib = NaiveCalendar::new();
        let morning = at(2024, 6, 1, 8, 0);
        let evening = at(2024, 6, 1, 20, 0);
        assert!(lib.is_before(&morning, &evening));
        assert!(lib.is_after(&evening, &morning));
        assert!(lib.is_same_day(&morning, &evening));
        assert!(lib.is_same_month(&morning, &ymd(2024, 6, 30)));
        assert!(!lib.is_same_month(&morning, &ymd(2023, 6, 1)));
        assert!(lib.is_same_year(&morning, &ymd(2024, 12, 31)));
    }

    #[test]
    fn test_iso_week_numbers() {
        let lib = NaiveCalendar::new();
        assert_eq!(lib.get_iso_week(&ymd(2021, 1, 4)), 1);
        assert_eq!(lib.get_iso_week(&ymd(2021, 1, 3)), 53);
        assert_eq!(lib.get_iso_week(&ymd(2024, 12, 30)), 1);
    }

    #[test]
    fn test_locale_week_numbers() {
        let lib = NaiveCalendar::new();
        // Sunday weeks, week 1 contains Jan 1
        assert_eq!(lib.get_week(&ymd(2024, 1, 1), DayOfWeek::SUNDAY, 1), 1);
        assert_eq!(lib.get_week(&ymd(2024, 1, 7), DayOfWeek::SUNDAY, 1), 2);
        assert_eq!(lib.get_week(&ymd(2024, 12, 29), DayOfWeek::SUNDAY, 1), 1);
        assert_eq!(lib.get_week(&ymd(2024, 12, 28), DayOfWeek::SUNDAY, 1), 52);
        // Monday weeks with Jan 4 rule agree with ISO
        for date in [ymd(2021, 1, 3), ymd(2021, 1, 4), ymd(2026, 12, 31)] {
            assert_eq!(
                lib.get_week(&date, DayOfWeek::MONDAY, FIRST_WEEK_CONTAINS_JAN_4),
                lib.get_iso_week(&date)
            );
        }
    }

    #[test]
    fn test_broadcast_week_numbers() {
        let lib = NaiveCalendar::new();
        // 2025-01-01 is a Wednesday; broadcast week 1 starts Monday 2024-12-30
        assert_eq!(lib.get_broadcast_week(&ymd(2024, 12, 30)), 1);
        assert_eq!(lib.get_broadcast_week(&ymd(2025, 1, 6)), 2);
    }

    #[test]
    fn test_day_of_week_and_extremes() {
        let lib = NaiveCalendar::new();
        assert_eq!(lib.day_of_week(&ymd(2024, 6, 2)), DayOfWeek::SUNDAY);
        let dates = [ymd(2024, 6, 2), ymd(2023, 1, 1), ymd(2025, 3, 3)];
        assert_eq!(lib.min(&dates), Some(ymd(2023, 1, 1)));
        assert_eq!(lib.max(&dates), Some(ymd(2025, 3, 3)));
        assert_eq!(lib.min(&[]), None);
    }

    #[test]
    fn test_format() {
        let lib = NaiveCalendar::new();
        let date = at(2024, 6, 2, 9, 5);
        assert_eq!(lib.format(&date, "%Y-%m-%d %H:%M").unwrap(), "2024-06-02 09:05");
        assert!(matches!(
            lib.format(&date, "%Q"),
            Err(CalendarError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_shift_days_saturates() {
        assert_eq!(shift_days(NaiveDate::MAX, 10), NaiveDate::MAX);
        assert_eq!(shift_days(NaiveDate::MIN, -10), NaiveDate::MIN);
    }
}
