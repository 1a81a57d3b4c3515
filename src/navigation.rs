//! Month navigation within the navigable bounds.

use crate::capability::DateCapability;
use tracing::trace;

/// Navigable span of a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavBounds<D> {
    /// First day of the first navigable month.
    pub start: Option<D>,
    /// Start of the last day of the last navigable month.
    pub end:   Option<D>,
}

impl<D> NavBounds<D> {
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end:   None,
        }
    }
}

impl<D: Clone + Ord> NavBounds<D> {
    /// Expands navigable months to their first and last days.
    pub fn resolve<C>(lib: &C, start_month: Option<&D>, end_month: Option<&D>) -> Self
    where
        C: DateCapability<Date = D>,
    {
        Self {
            start: start_month.map(|month| lib.start_of_month(month)),
            end:   end_month.map(|month| lib.start_of_day(&lib.end_of_month(month))),
        }
    }

    /// The day is before the start bound.
    pub fn is_before_start<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        self.start
            .as_ref()
            .is_some_and(|start| lib.difference_in_calendar_days(date, start) < 0)
    }

    /// The day is after the end bound.
    pub fn is_after_end<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        self.end
            .as_ref()
            .is_some_and(|end| lib.difference_in_calendar_days(date, end) > 0)
    }

    /// Clamps a date into the bounds.
    pub fn clamp<C>(&self, lib: &C, date: D) -> D
    where
        C: DateCapability<Date = D>,
    {
        if self.is_before_start(lib, &date) {
            if let Some(start) = &self.start {
                return start.clone();
            }
        }
        if self.is_after_end(lib, &date) {
            if let Some(end) = &self.end {
                return end.clone();
            }
        }
        date
    }
}

/// Options that shape month-to-month navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavOptions {
    pub number_of_months:   u8,
    pub paged_navigation:   bool,
    pub disable_navigation: bool,
}

impl NavOptions {
    const fn step(&self) -> i32 {
        if self.paged_navigation {
            self.number_of_months as i32
        } else {
            1
        }
    }
}

/// First month shown when the calendar opens.
///
/// The requested month (or today's) is pulled back so every displayed
/// month fits before the end bound, then pushed forward to the start bound.
pub fn initial_month<C>(
    lib: &C,
    requested: Option<&C::Date>,
    today: &C::Date,
    bounds: &NavBounds<C::Date>,
    number_of_months: u8,
) -> C::Date
where
    C: DateCapability,
{
    let mut month = requested.unwrap_or(today).clone();
    if let Some(end) = &bounds.end {
        if lib.difference_in_calendar_months(end, &month) < i32::from(number_of_months) {
            month = lib.add_months(end, 1 - i32::from(number_of_months));
        }
    }
    if let Some(start) = &bounds.start {
        if lib.difference_in_calendar_months(&month, start) < 0 {
            month = start.clone();
        }
    }
    lib.start_of_month(&month)
}

/// Month to show first after moving forward, if navigation allows it.
pub fn next_month<C>(
    lib: &C,
    first_displayed: &C::Date,
    bounds: &NavBounds<C::Date>,
    options: &NavOptions,
) -> Option<C::Date>
where
    C: DateCapability,
{
    if options.disable_navigation {
        return None;
    }
    let month = lib.start_of_month(first_displayed);
    if let Some(end) = &bounds.end {
        if lib.difference_in_calendar_months(end, first_displayed) < i32::from(options.number_of_months) {
            trace!("end bound reached");
            return None;
        }
    }
    Some(lib.add_months(&month, options.step()))
}

/// Month to show first after moving back, if navigation allows it.
pub fn previous_month<C>(
    lib: &C,
    first_displayed: &C::Date,
    bounds: &NavBounds<C::Date>,
    options: &NavOptions,
) -> Option<C::Date>
where
    C: DateCapability,
{
    if options.disable_navigation {
        return None;
    }
    let month = lib.start_of_month(first_displayed);
    if let Some(start) = &bounds.start {
        if lib.difference_in_calendar_months(&month, start) <= 0 {
            trace!("start bound reached");
            return None;
        }
    }
    Some(lib.add_months(&month, -options.step()))
}

/// First day of `month`, clamped to the months of the bounds.
pub fn clamp_month<C>(lib: &C, month: &C::Date, bounds: &NavBounds<C::Date>) -> C::Date
where
    C: DateCapability,
{
    let mut month = lib.start_of_month(month);
    if let Some(start) = &bounds.start {
        let first = lib.start_of_month(start);
        if month < first {
            month = first;
        }
    }
    if let Some(end) = &bounds.end {
        let last = lib.start_of_month(end);
        if month > last {
            month = last;
        }
    }
    month
}
