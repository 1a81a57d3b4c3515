use crate::{CalendarError, DateCapability, RANGE_SEPARATOR};

/// A closed range of dates, inclusive at both ends at day granularity.
/// The start date is never after the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateRange<D> {
    from: D,
    to:   D,
}

impl<D: Ord> DateRange<D> {
    /// Creates a range from two endpoints in either order.
    pub fn new(from: D, to: D) -> Self {
        if from > to {
            Self { from: to, to: from }
        } else {
            Self { from, to }
        }
    }

    /// Creates a range from endpoints the caller has already ordered.
    ///
    /// # Panics
    /// Panics if `from > to`; callers are expected to order the endpoints.
    pub fn ordered(from: D, to: D) -> Self {
        assert!(from <= to, "inverted date range endpoints");
        Self { from, to }
    }
}

impl<D> DateRange<D> {
    /// Returns the start date of the range
    pub const fn from(&self) -> &D {
        &self.from
    }

    /// Returns the end date of the range
    pub const fn to(&self) -> &D {
        &self.to
    }

    /// Returns both start and end dates as a tuple
    pub const fn dates(&self) -> (&D, &D) {
        (&self.from, &self.to)
    }

    pub fn into_dates(self) -> (D, D) {
        (self.from, self.to)
    }

    /// Checks if the range contains a given date, comparing calendar days.
    pub fn contains<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        lib.difference_in_calendar_days(date, &self.from) >= 0
            && lib.difference_in_calendar_days(&self.to, date) >= 0
    }

    /// Number of calendar days from start to end; 0 for a single-day range.
    pub fn span_days<C>(&self, lib: &C) -> i64
    where
        C: DateCapability<Date = D>,
    {
        lib.difference_in_calendar_days(&self.to, &self.from)
    }

    /// Calendar days covered by the range, start of each day, in order.
    pub fn days<'a, C>(&'a self, lib: &'a C) -> impl Iterator<Item = D>
    where
        C: DateCapability<Date = D>,
    {
        let start = lib.start_of_day(&self.from);
        (0..=self.span_days(lib).max(0)).map(move |offset| lib.add_days(&start, offset))
    }

    /// ISO 8601 interval form: `start/end`.
    pub fn to_iso_string<C>(&self, lib: &C) -> String
    where
        C: DateCapability<Date = D>,
    {
        format!(
            "{}{RANGE_SEPARATOR}{}",
            lib.to_iso_string(&self.from),
            lib.to_iso_string(&self.to)
        )
    }
}

impl<D: Ord> DateRange<D> {
    /// Parses the ISO 8601 interval form `start/end`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidRange` for a missing or repeated
    /// separator and `CalendarError::InvalidDate` for a bad endpoint.
    pub fn parse<C>(lib: &C, input: &str) -> Result<Self, CalendarError>
    where
        C: DateCapability<Date = D>,
    {
        let trimmed = input.trim();
        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();

        match separator_count {
            0 => Err(CalendarError::InvalidRange(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {input}"
            ))),
            1 => {
                let (start, end) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(|| {
                    CalendarError::InvalidRange(format!(
                        "Separator '{RANGE_SEPARATOR}' not found despite count == 1"
                    ))
                })?;
                let from = lib.parse_iso(start)?;
                let to = lib.parse_iso(end)?;
                Ok(Self::new(from, to))
            },
            _ => Err(CalendarError::InvalidRange(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}
