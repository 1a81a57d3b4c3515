//! The visible date matrix.
//!
//! A grid is built in three steps: the display months following the focus
//! month, the contiguous run of dates covering all of them, and the split
//! of that run into per-month weeks. The run is enumerated on civil dates
//! and only then converted with [`DateCapability::from_calendar_date`], so a
//! zoned calendar gets exactly one cell per civil day across offset changes.

use crate::CalendarError;
use crate::capability::{DateCapability, first_of_month, last_of_month, shift_days, week_start};
use crate::config::GridConfig;
use crate::consts::{DAYS_PER_WEEK, MAX_YEAR, MIN_YEAR};
use crate::types::DayOfWeek;
use chrono::{Datelike, NaiveDate};
use std::hash::{Hash, Hasher};
use tracing::{debug, instrument, trace};

/// Identity of a grid cell: the civil day and the month it is shown in.
///
/// The same date appears twice in a multi-month grid when it is an outside
/// day of one month and an inside day of the next; the keys differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey {
    pub date:          NaiveDate,
    pub display_month: NaiveDate,
}

/// A day cell of the grid.
#[derive(Debug, Clone)]
pub struct CalendarDay<D> {
    date:          D,
    display_month: D,
    outside:       bool,
    key:           DayKey,
}

impl<D: Clone> CalendarDay<D> {
    pub fn new<C>(lib: &C, date: D, display_month: D) -> Self
    where
        C: DateCapability<Date = D>,
    {
        let key = DayKey {
            date:          lib.calendar_date(&date),
            display_month: first_of_month(lib.calendar_date(&display_month)),
        };
        let outside = !lib.is_same_month(&date, &display_month);
        Self {
            date,
            display_month,
            outside,
            key,
        }
    }

    pub const fn date(&self) -> &D {
        &self.date
    }

    /// First day of the month this cell is displayed in.
    pub const fn display_month(&self) -> &D {
        &self.display_month
    }

    /// The day belongs to a month other than the one it is displayed in.
    pub const fn is_outside(&self) -> bool {
        self.outside
    }

    pub const fn key(&self) -> DayKey {
        self.key
    }

    /// Same calendar day shown in the same month.
    pub fn is_equal_to(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<D> PartialEq for CalendarDay<D> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<D> Eq for CalendarDay<D> {}

impl<D> Hash for CalendarDay<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// A grid row of seven days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeek<D> {
    week_number: u32,
    days:        Vec<CalendarDay<D>>,
}

impl<D> CalendarWeek<D> {
    pub const fn week_number(&self) -> u32 {
        self.week_number
    }

    pub fn days(&self) -> &[CalendarDay<D>] {
        &self.days
    }
}

/// One displayed month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth<D> {
    date:  D,
    weeks: Vec<CalendarWeek<D>>,
}

impl<D> CalendarMonth<D> {
    /// First day of the month.
    pub const fn date(&self) -> &D {
        &self.date
    }

    pub fn weeks(&self) -> &[CalendarWeek<D>] {
        &self.weeks
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay<D>> {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }
}

/// Every day of every month, in display order.
pub fn all_days<D>(months: &[CalendarMonth<D>]) -> impl Iterator<Item = &CalendarDay<D>> {
    months.iter().flat_map(CalendarMonth::days)
}

/// Every week of every month, in display order.
pub fn all_weeks<D>(months: &[CalendarMonth<D>]) -> impl Iterator<Item = &CalendarWeek<D>> {
    months.iter().flat_map(|month| month.weeks.iter())
}

/// First day of each month to display, starting at the month of `focus`.
///
/// Stops early rather than show a month after `end_month`.
pub fn display_months<C>(
    lib: &C,
    focus: &C::Date,
    config: &GridConfig,
    end_month: Option<&C::Date>,
) -> Vec<C::Date>
where
    C: DateCapability,
{
    let first = lib.start_of_month(focus);
    let mut months = Vec::with_capacity(usize::from(config.number_of_months.get()));
    for offset in 0..i32::from(config.number_of_months.get()) {
        let month = lib.add_months(&first, offset);
        if let Some(end) = end_month {
            if lib.difference_in_calendar_months(&month, end) > 0 {
                break;
            }
        }
        months.push(month);
    }
    months
}

/// First cell of `month`'s grid.
pub fn grid_start(month: NaiveDate, config: &GridConfig) -> NaiveDate {
    let first = first_of_month(month);
    if config.broadcast_calendar {
        week_start(first, DayOfWeek::MONDAY)
    } else {
        week_start(first, config.effective_week_start())
    }
}

/// Last cell of `month`'s grid, before any fixed-week padding.
pub fn grid_end(month: NaiveDate, config: &GridConfig) -> NaiveDate {
    let last = last_of_month(month);
    if config.broadcast_calendar {
        // the month's last Sunday closes its final broadcast week
        shift_days(last, -i64::from(last.weekday().num_days_from_sunday()))
    } else {
        let start = week_start(last, config.effective_week_start());
        shift_days(start, DAYS_PER_WEEK as i64 - 1)
    }
}

/// The contiguous civil dates covering all display months.
///
/// With fixed weeks the run is padded to the canonical length of every
/// month spanned.
pub fn grid_dates<C>(lib: &C, months: &[C::Date], config: &GridConfig) -> Vec<NaiveDate>
where
    C: DateCapability,
{
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Vec::new();
    };
    let start = grid_start(lib.calendar_date(first), config);
    let end = grid_end(lib.calendar_date(last), config);

    let mut dates: Vec<NaiveDate> = start.iter_days().take_while(|date| *date <= end).collect();

    if config.fixed_weeks {
        let spanned = lib.difference_in_calendar_months(last, first).max(0) as usize + 1;
        let target = config.fixed_days_per_month() * spanned;
        extend_to(&mut dates, target);
    }
    dates
}

/// Builds the grid of display months starting at `focus_month`.
///
/// # Errors
/// Returns `CalendarError::Configuration` for a focus month outside years
/// 1 to 9999, an `end_month` before the focus month, or an invalid config.
#[instrument(skip_all, fields(months = config.number_of_months.get()))]
pub fn build<C>(
    lib: &C,
    focus_month: &C::Date,
    config: &GridConfig,
    end_month: Option<&C::Date>,
) -> Result<Vec<CalendarMonth<C::Date>>, CalendarError>
where
    C: DateCapability,
{
    config.validate()?;

    let year = lib.calendar_date(focus_month).year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(CalendarError::Configuration(format!(
            "focus month year {year} is outside {MIN_YEAR}..={MAX_YEAR}"
        )));
    }
    if let Some(end) = end_month {
        if lib.difference_in_calendar_months(end, focus_month) < 0 {
            return Err(CalendarError::Configuration(format!(
                "end month {} is before focus month {}",
                lib.to_iso_string(end),
                lib.to_iso_string(focus_month)
            )));
        }
    }

    let months = display_months(lib, focus_month, config, end_month);
    let mut dates = grid_dates(lib, &months, config);

    let mut built = Vec::with_capacity(months.len());
    for month in months {
        let civil_month = lib.calendar_date(&month);
        let window_start = grid_start(civil_month, config);
        let window_end = grid_end(civil_month, config);

        let mut month_dates: Vec<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|date| (window_start..=window_end).contains(date))
            .collect();

        if config.fixed_weeks {
            let canonical = config.fixed_days_per_month();
            if month_dates.len() < canonical {
                let missing = canonical - month_dates.len();
                let needed_end = shift_days(window_end, missing as i64);
                if dates.last().is_some_and(|last| *last < needed_end) {
                    trace!(%needed_end, "extending fixed-week pool");
                    extend_through(&mut dates, needed_end);
                }
                month_dates.extend(
                    dates
                        .iter()
                        .copied()
                        .filter(|date| *date > window_end && *date <= needed_end),
                );
            }
        }

        let weeks = month_dates
            .chunks(DAYS_PER_WEEK)
            .map(|chunk| {
                let days: Vec<_> = chunk
                    .iter()
                    .map(|date| CalendarDay::new(lib, lib.from_calendar_date(*date), month.clone()))
                    .collect();
                let number = days
                    .first()
                    .map_or(0, |day| week_number(lib, day.date(), config));
                CalendarWeek {
                    week_number: number,
                    days,
                }
            })
            .collect();

        built.push(CalendarMonth { date: month, weeks });
    }

    if config.reverse_months {
        built.reverse();
    }

    debug!(
        months = built.len(),
        days = built.iter().map(|month| month.days().count()).sum::<usize>(),
        "calendar grid built"
    );
    Ok(built)
}

/// The seven week-header dates around `reference`, in display order.
pub fn weekdays<C>(lib: &C, config: &GridConfig, reference: &C::Date) -> Vec<C::Date>
where
    C: DateCapability,
{
    let start = lib.start_of_week(reference, config.effective_week_start());
    (0..DAYS_PER_WEEK as i64)
        .map(|offset| lib.add_days(&start, offset))
        .collect()
}

/// Week number shown for a row starting at `date`.
pub fn week_number<C>(lib: &C, date: &C::Date, config: &GridConfig) -> u32
where
    C: DateCapability,
{
    if config.broadcast_calendar {
        lib.get_broadcast_week(date)
    } else if config.iso_week {
        lib.get_iso_week(date)
    } else {
        lib.get_week(date, config.week_starts_on, config.first_week_contains_date)
    }
}

fn extend_to(dates: &mut Vec<NaiveDate>, target: usize) {
    while dates.len() < target {
        let Some(next) = dates.last().and_then(|last| last.succ_opt()) else {
            break;
        };
        dates.push(next);
    }
}

fn extend_through(dates: &mut Vec<NaiveDate>, end: NaiveDate) {
    while let Some(next) = dates.last().and_then(|last| last.succ_opt()) {
        if next > end {
            break;
        }
        dates.push(next);
    }
}
