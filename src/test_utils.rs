//! Shared helpers for unit tests.

use crate::grid::DayKey;
use chrono::{NaiveDate, NaiveDateTime};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Midnight of the given day.
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDateTime {
    at(year, month, day, 0, 0)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, minute, 0).unwrap()
}

/// Grid key of `year-month-day` shown in `display_year-display_month`.
pub fn key(year: i32, month: u32, day: u32, display_year: i32, display_month: u32) -> DayKey {
    DayKey {
        date:          date(year, month, day),
        display_month: date(display_year, display_month, 1),
    }
}
