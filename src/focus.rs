//! Keyboard focus: where focus lands first and where a key press moves it.

use crate::capability::DateCapability;
use crate::config::GridConfig;
use crate::consts::MAX_FOCUS_ATTEMPTS;
use crate::grid::CalendarDay;
use crate::modifiers::{DayMatchers, ModifierTable};
use crate::navigation::NavBounds;
use crate::prelude::*;
use tracing::{debug, trace};

/// Distance of one focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FocusUnit {
    #[display(fmt = "day")]
    Day,
    #[display(fmt = "week")]
    Week,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "start_of_week")]
    StartOfWeek,
    #[display(fmt = "end_of_week")]
    EndOfWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FocusDirection {
    #[display(fmt = "before")]
    Before,
    #[display(fmt = "after")]
    After,
}

impl FocusDirection {
    const fn sign(self) -> i32 {
        match self {
            Self::Before => -1,
            Self::After => 1,
        }
    }
}

/// What a focus move has to respect besides the grid.
#[derive(Debug)]
pub struct FocusContext<'a, D> {
    pub matchers: &'a DayMatchers<D>,
    pub bounds:   &'a NavBounds<D>,
    pub grid:     &'a GridConfig,
}

/// Day that should receive focus when the grid gains it.
///
/// In order of preference: a day pinned by the `focused` modifier, the
/// previously focused day, the first selected day, today, then the first
/// focusable day. Disabled, hidden and outside days never qualify.
pub fn initial_focus<'a, D, I>(
    days: I,
    table: &ModifierTable,
    is_selected: impl Fn(&D) -> bool,
    previous: Option<&CalendarDay<D>>,
) -> Option<CalendarDay<D>>
where
    D: Clone + 'a,
    I: IntoIterator<Item = &'a CalendarDay<D>>,
{
    let mut best: Option<(u8, &CalendarDay<D>)> = None;
    let mut first_focusable = None;

    for day in days {
        let modifiers = table.for_day(day);
        if !modifiers.is_focusable() {
            continue;
        }
        first_focusable.get_or_insert(day);

        let rank = if table.is_pinned(&day.key()) {
            4
        } else if previous.is_some_and(|previous| previous.is_equal_to(day)) {
            3
        } else if is_selected(day.date()) {
            2
        } else if modifiers.today {
            1
        } else {
            continue;
        };
        if best.is_none_or(|(best_rank, _)| rank > best_rank) {
            best = Some((rank, day));
        }
    }

    best.map(|(_, day)| day).or(first_focusable).cloned()
}

/// Next focus target from `from`, or `None` when no focusable day is found
/// within [`MAX_FOCUS_ATTEMPTS`] steps.
///
/// Steps are clamped into the navigable bounds on the side of travel. The
/// returned day is displayed in its own month.
pub fn move_focus<C>(
    lib: &C,
    unit: FocusUnit,
    direction: FocusDirection,
    from: &CalendarDay<C::Date>,
    context: &FocusContext<'_, C::Date>,
) -> Option<CalendarDay<C::Date>>
where
    C: DateCapability,
{
    let mut current = from.date().clone();
    for attempt in 0..MAX_FOCUS_ATTEMPTS {
        let candidate = step(lib, unit, direction, &current, context);
        if !context.matchers.excludes(lib, &candidate) {
            trace!(attempt, %unit, %direction, "focus target found");
            let month = lib.start_of_month(&candidate);
            return Some(CalendarDay::new(lib, candidate, month));
        }
        current = candidate;
    }
    debug!(%unit, %direction, "no focusable day in reach");
    None
}

fn step<C>(
    lib: &C,
    unit: FocusUnit,
    direction: FocusDirection,
    date: &C::Date,
    context: &FocusContext<'_, C::Date>,
) -> C::Date
where
    C: DateCapability,
{
    let sign = direction.sign();
    let grid = context.grid;
    let week_start = grid.effective_week_start();
    let moved = match unit {
        FocusUnit::Day => lib.add_days(date, i64::from(sign)),
        FocusUnit::Week => lib.add_weeks(date, i64::from(sign)),
        FocusUnit::Month => lib.add_months(date, sign),
        FocusUnit::Year => lib.add_years(date, sign),
        FocusUnit::StartOfWeek => lib.start_of_week(date, week_start),
        FocusUnit::EndOfWeek => lib.start_of_day(&lib.end_of_week(date, week_start)),
    };

    match direction {
        FocusDirection::Before => match &context.bounds.start {
            Some(start) if lib.is_before(&moved, start) => start.clone(),
            _ => moved,
        },
        FocusDirection::After => match &context.bounds.end {
            Some(end) if lib.is_after(&moved, end) => end.clone(),
            _ => moved,
        },
    }
}
