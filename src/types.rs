use crate::CalendarError;
use crate::consts::{MONDAY, SATURDAY, SUNDAY};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// A day of the week guaranteed to be in the range `0..=6`, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(SUNDAY);
    pub const MONDAY: Self = Self(MONDAY);
    pub const SATURDAY: Self = Self(SATURDAY);

    /// Creates a new `DayOfWeek`, validating that it's <= 6
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDayOfWeek` if the value is > 6.
    pub fn new(value: u8) -> Result<Self, CalendarError> {
        if value > SATURDAY {
            return Err(CalendarError::InvalidDayOfWeek(value));
        }
        Ok(Self(value))
    }

    /// Returns the day number, 0 for Sunday
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Converts to chrono's weekday
    pub const fn weekday(self) -> Weekday {
        match self.0 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

impl Default for DayOfWeek {
    fn default() -> Self {
        Self::SUNDAY
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6
        Self(weekday.num_days_from_sunday() as u8)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.weekday())
    }
}

/// Number of months shown side by side, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthCount(NonZeroU8);

impl MonthCount {
    pub const ONE: Self = Self(NonZeroU8::MIN);

    /// Creates a new `MonthCount`, validating that it's non-zero
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonthCount` if the value is 0.
    pub fn new(value: u8) -> Result<Self, CalendarError> {
        NonZeroU8::new(value)
            .map(Self)
            .ok_or(CalendarError::InvalidMonthCount(value))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl Default for MonthCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u8> for MonthCount {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MonthCount> for u8 {
    fn from(count: MonthCount) -> Self {
        count.0.get()
    }
}

impl fmt::Display for MonthCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_week_new_valid() {
        for d in 0..=6 {
            assert!(DayOfWeek::new(d).is_ok(), "Day {d} should be valid");
        }
    }

    #[test]
    fn test_day_of_week_new_invalid() {
        let result = DayOfWeek::new(7);
        assert!(matches!(result, Err(CalendarError::InvalidDayOfWeek(7))));
    }

    #[test]
    fn test_day_of_week_weekday_mapping() {
        assert_eq!(DayOfWeek::SUNDAY.weekday(), Weekday::Sun);
        assert_eq!(DayOfWeek::MONDAY.weekday(), Weekday::Mon);
        assert_eq!(DayOfWeek::SATURDAY.weekday(), Weekday::Sat);
        for weekday in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
            assert_eq!(DayOfWeek::from(weekday).weekday(), weekday);
        }
    }

    #[test]
    fn test_day_of_week_display() {
        assert_eq!(DayOfWeek::MONDAY.to_string(), "Mon");
    }

    #[test]
    fn test_day_of_week_serde() {
        let day = DayOfWeek::new(3).unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "3");

        let parsed: DayOfWeek = serde_json::from_str(&json).unwrap();
        assert_eq!(day, parsed);

        let result: Result<DayOfWeek, _> = serde_json::from_str("9");
        assert!(result.is_err());
    }

    #[test]
    fn test_month_count_new() {
        assert_eq!(MonthCount::new(3).unwrap().get(), 3);
        assert!(matches!(
            MonthCount::new(0),
            Err(CalendarError::InvalidMonthCount(0))
        ));
        assert_eq!(MonthCount::default(), MonthCount::ONE);
    }

    #[test]
    fn test_month_count_try_from_and_into() {
        let count: MonthCount = 2.try_into().unwrap();
        let value: u8 = count.into();
        assert_eq!(value, 2);

        let result: Result<MonthCount, _> = 0.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_month_count_serde() {
        let parsed: MonthCount = serde_json::from_str("4").unwrap();
        assert_eq!(parsed.get(), 4);
        assert!(serde_json::from_str::<MonthCount>("0").is_err());
    }
}
