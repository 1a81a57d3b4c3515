//! Calendar grid engine for month-view date pickers.
//!
//! The crate computes what a date picker shows and how it reacts, leaving
//! rendering to the caller:
//!
//! - the grid of one or more months, with standard, ISO or broadcast weeks
//!   and optional fixed six-row months ([`grid`]);
//! - the modifiers of every day: disabled, hidden, outside, today, focused,
//!   selection flags and named custom modifiers ([`modifiers`], [`matcher`]);
//! - single, multiple and range selection ([`selection`]);
//! - keyboard focus targets ([`focus`]) and month navigation ([`navigation`]).
//!
//! Every computation goes through a [`DateCapability`], so the same engine
//! runs on wall-clock dates ([`NaiveCalendar`]) or zoned instants
//! ([`ZonedCalendar`]). [`Calendar`] ties the pieces into a stateful picker.

mod consts;
mod prelude;
mod types;

pub mod calendar;
pub mod capability;
pub mod config;
pub mod focus;
pub mod grid;
pub mod matcher;
pub mod modifiers;
pub mod naive;
pub mod navigation;
pub mod range;
pub mod record;
pub mod selection;
pub mod zoned;

#[cfg(test)]
mod test_utils;

pub use calendar::{Calendar, CalendarOptions};
pub use capability::DateCapability;
pub use config::{CalendarConfig, GridConfig, MatcherConfig, SelectionConfig, SelectionMode};
pub use consts::*;
pub use focus::{FocusDirection, FocusUnit};
pub use grid::{CalendarDay, CalendarMonth, CalendarWeek, DayKey};
pub use matcher::Matcher;
pub use modifiers::{DayFlag, DayMatchers, ModifierTable, Modifiers};
pub use naive::NaiveCalendar;
pub use navigation::NavBounds;
pub use range::DateRange;
pub use record::SelectionRecord;
pub use selection::{RangeSelection, Selection, Selector};
pub use types::{DayOfWeek, MonthCount};
pub use zoned::{OffsetCache, ZonedCalendar};

/// Error type for calendar operations.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Day of week outside `0..=6`.
    #[error("Invalid day of week: {0} (must be 0-{max})", max = SATURDAY)]
    InvalidDayOfWeek(u8),

    #[error("Invalid number of months: {0} (must be at least 1)")]
    InvalidMonthCount(u8),

    /// Options that cannot produce a calendar.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Input that is not a date.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    #[error("Invalid format pattern: {0:?}")]
    InvalidFormat(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
