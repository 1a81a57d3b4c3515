//! Day matchers: the values that decide whether a day is disabled, hidden
//! or carries a custom modifier.

use crate::CalendarError;
use crate::capability::DateCapability;
use crate::config::MatcherConfig;
use crate::consts::RANGE_SEPARATOR;
use crate::range::DateRange;
use crate::types::DayOfWeek;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Shared predicate over dates.
pub type DatePredicate<D> = Arc<dyn Fn(&D) -> bool + Send + Sync>;

/// A test of one date. All comparisons are at day granularity.
#[derive(Clone)]
pub enum Matcher<D> {
    /// Matches every day, or none.
    Flag(bool),
    Date(D),
    /// Any of the dates.
    Dates(Vec<D>),
    DayOfWeek(BTreeSet<DayOfWeek>),
    /// Inclusive range. With one end missing only that day matches.
    Range { from: Option<D>, to: Option<D> },
    /// Days strictly before the date.
    Before(D),
    /// Days strictly after the date.
    After(D),
    /// When `before` is later than `after`: days outside `[after, before]`.
    /// Otherwise: days inside `[before, after]`. Both ends inclusive.
    Interval { before: D, after: D },
    Predicate(DatePredicate<D>),
}

impl<D> Matcher<D> {
    pub fn predicate(predicate: impl Fn(&D) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(predicate))
    }

    pub fn days_of_week(days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        Self::DayOfWeek(days.into_iter().collect())
    }

    /// Sundays and Saturdays.
    pub fn weekends() -> Self {
        Self::days_of_week([DayOfWeek::SUNDAY, DayOfWeek::SATURDAY])
    }

    pub fn matches<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        match self {
            Self::Flag(value) => *value,
            Self::Date(day) => lib.is_same_day(date, day),
            Self::Dates(days) => days.iter().any(|day| lib.is_same_day(date, day)),
            Self::DayOfWeek(days) => days.contains(&lib.day_of_week(date)),
            Self::Range { from, to } => match (from, to) {
                (Some(from), Some(to)) => {
                    let (from, to) = if lib.difference_in_calendar_days(to, from) < 0 {
                        (to, from)
                    } else {
                        (from, to)
                    };
                    lib.difference_in_calendar_days(date, from) >= 0
                        && lib.difference_in_calendar_days(to, date) >= 0
                },
                (Some(only), None) | (None, Some(only)) => lib.is_same_day(date, only),
                (None, None) => false,
            },
            Self::Before(before) => lib.difference_in_calendar_days(before, date) > 0,
            Self::After(after) => lib.difference_in_calendar_days(date, after) > 0,
            Self::Interval { before, after } => {
                if lib.difference_in_calendar_days(before, after) > 0 {
                    lib.difference_in_calendar_days(after, date) > 0
                        || lib.difference_in_calendar_days(date, before) > 0
                } else {
                    lib.difference_in_calendar_days(date, before) >= 0
                        && lib.difference_in_calendar_days(after, date) >= 0
                }
            },
            Self::Predicate(predicate) => predicate(date),
        }
    }
}

impl<D: Clone + Ord> Matcher<D> {
    /// Builds a matcher from its serialized form.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` / `CalendarError::InvalidRange`
    /// for unparseable dates and `CalendarError::Configuration` for a bounds
    /// matcher with neither bound.
    pub fn from_config<C>(lib: &C, config: &MatcherConfig) -> Result<Self, CalendarError>
    where
        C: DateCapability<Date = D>,
    {
        let matcher = match config {
            MatcherConfig::Flag(value) => Self::Flag(*value),
            MatcherConfig::Date(raw) if raw.contains(RANGE_SEPARATOR) => {
                let (from, to) = DateRange::parse(lib, raw)?.into_dates();
                Self::Range {
                    from: Some(from),
                    to:   Some(to),
                }
            },
            MatcherConfig::Date(raw) => Self::Date(lib.parse_iso(raw)?),
            MatcherConfig::DayOfWeek { day_of_week } => Self::days_of_week(day_of_week.iter().copied()),
            MatcherConfig::Bounds { before, after } => {
                let before = before.map(|date| lib.from_calendar_date(date));
                let after = after.map(|date| lib.from_calendar_date(date));
                match (before, after) {
                    (Some(before), Some(after)) => Self::Interval { before, after },
                    (Some(before), None) => Self::Before(before),
                    (None, Some(after)) => Self::After(after),
                    (None, None) => {
                        return Err(CalendarError::Configuration(
                            "bounds matcher needs `before`, `after` or both".to_owned(),
                        ));
                    },
                }
            },
        };
        Ok(matcher)
    }

    /// Builds every matcher of a list.
    ///
    /// # Errors
    /// Fails on the first matcher [`Matcher::from_config`] rejects.
    pub fn from_configs<C>(lib: &C, configs: &[MatcherConfig]) -> Result<Vec<Self>, CalendarError>
    where
        C: DateCapability<Date = D>,
    {
        configs
            .iter()
            .map(|config| Self::from_config(lib, config))
            .collect()
    }
}

impl<D> From<DateRange<D>> for Matcher<D> {
    fn from(range: DateRange<D>) -> Self {
        let (from, to) = range.into_dates();
        Self::Range {
            from: Some(from),
            to:   Some(to),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Matcher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => f.debug_tuple("Flag").field(value).finish(),
            Self::Date(date) => f.debug_tuple("Date").field(date).finish(),
            Self::Dates(dates) => f.debug_tuple("Dates").field(dates).finish(),
            Self::DayOfWeek(days) => f.debug_tuple("DayOfWeek").field(days).finish(),
            Self::Range { from, to } => f
                .debug_struct("Range")
                .field("from", from)
                .field("to", to)
                .finish(),
            Self::Before(date) => f.debug_tuple("Before").field(date).finish(),
            Self::After(date) => f.debug_tuple("After").field(date).finish(),
            Self::Interval { before, after } => f
                .debug_struct("Interval")
                .field("before", before)
                .field("after", after)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// True if any matcher in the list matches.
pub fn matches_any<C>(lib: &C, matchers: &[Matcher<C::Date>], date: &C::Date) -> bool
where
    C: DateCapability,
{
    matchers.iter().any(|matcher| matcher.matches(lib, date))
}
