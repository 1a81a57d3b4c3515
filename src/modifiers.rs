//! Per-day modifier bags.
//!
//! [`compile`] classifies every cell of a built grid once; the selection
//! and focus flags are layered on afterwards so a new selection does not
//! re-run the matchers.

use crate::capability::DateCapability;
use crate::consts::FOCUSED_MODIFIER;
use crate::grid::{CalendarDay, CalendarMonth, DayKey, all_days};
use crate::matcher::{Matcher, matches_any};
use crate::navigation::NavBounds;
use crate::prelude::*;
use crate::selection::{RangeSelection, Selector};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Built-in day modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum DayFlag {
    #[display(fmt = "disabled")]
    Disabled,
    #[display(fmt = "hidden")]
    Hidden,
    #[display(fmt = "outside")]
    Outside,
    #[display(fmt = "today")]
    Today,
    #[display(fmt = "focused")]
    Focused,
    #[display(fmt = "selected")]
    Selected,
    #[display(fmt = "range_start")]
    RangeStart,
    #[display(fmt = "range_middle")]
    RangeMiddle,
    #[display(fmt = "range_end")]
    RangeEnd,
}

impl DayFlag {
    pub const ALL: [Self; 9] = [
        Self::Disabled,
        Self::Hidden,
        Self::Outside,
        Self::Today,
        Self::Focused,
        Self::Selected,
        Self::RangeStart,
        Self::RangeMiddle,
        Self::RangeEnd,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.to_string() == name)
    }
}

/// Everything known about one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub disabled:     bool,
    pub hidden:       bool,
    pub outside:      bool,
    pub today:        bool,
    pub focused:      bool,
    pub selected:     bool,
    pub range_start:  bool,
    pub range_middle: bool,
    pub range_end:    bool,
    pub custom:       BTreeSet<String>,
}

impl Modifiers {
    pub const fn flag(&self, flag: DayFlag) -> bool {
        match flag {
            DayFlag::Disabled => self.disabled,
            DayFlag::Hidden => self.hidden,
            DayFlag::Outside => self.outside,
            DayFlag::Today => self.today,
            DayFlag::Focused => self.focused,
            DayFlag::Selected => self.selected,
            DayFlag::RangeStart => self.range_start,
            DayFlag::RangeMiddle => self.range_middle,
            DayFlag::RangeEnd => self.range_end,
        }
    }

    /// Looks up a built-in or custom modifier by name.
    pub fn get(&self, name: &str) -> bool {
        DayFlag::from_name(name).map_or_else(|| self.custom.contains(name), |flag| self.flag(flag))
    }

    /// Names of every modifier the day carries, built-ins first.
    pub fn names(&self) -> Vec<String> {
        DayFlag::ALL
            .into_iter()
            .filter(|flag| self.flag(*flag))
            .map(|flag| flag.to_string())
            .chain(self.custom.iter().cloned())
            .collect()
    }

    /// The day can take keyboard focus.
    pub const fn is_focusable(&self) -> bool {
        !self.disabled && !self.hidden && !self.outside
    }
}

/// Caller-supplied matchers.
#[derive(Debug, Clone)]
pub struct DayMatchers<D> {
    pub disabled: Vec<Matcher<D>>,
    pub hidden:   Vec<Matcher<D>>,
    /// Named custom modifiers. The name `focused` pins the initial focus.
    pub custom:   BTreeMap<String, Vec<Matcher<D>>>,
}

impl<D> Default for DayMatchers<D> {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            hidden:   Vec::new(),
            custom:   BTreeMap::new(),
        }
    }
}

impl<D> DayMatchers<D> {
    /// Disabled or hidden by a matcher, regardless of the grid.
    pub fn excludes<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        matches_any(lib, &self.disabled, date) || matches_any(lib, &self.hidden, date)
    }
}

/// Inputs of [`compile`] besides the grid.
#[derive(Debug)]
pub struct ModifierContext<'a, D> {
    pub matchers:          &'a DayMatchers<D>,
    pub bounds:            &'a NavBounds<D>,
    pub show_outside_days: bool,
    pub broadcast:         bool,
    pub today:             &'a D,
}

impl<D> ModifierContext<'_, D> {
    /// Classifies one cell against the context.
    pub fn classify<C>(&self, lib: &C, day: &CalendarDay<D>) -> Modifiers
    where
        C: DateCapability<Date = D>,
        D: Clone + Ord,
    {
        let date = day.date();
        let outside = day.is_outside();
        let hidden = matches_any(lib, &self.matchers.hidden, date)
            || self.bounds.is_before_start(lib, date)
            || self.bounds.is_after_end(lib, date)
            || (outside && !self.show_outside_days && !self.broadcast);

        let mut modifiers = Modifiers {
            disabled: matches_any(lib, &self.matchers.disabled, date),
            hidden,
            outside,
            today: lib.is_same_day(date, self.today),
            ..Modifiers::default()
        };
        for (name, matchers) in &self.matchers.custom {
            if !matches_any(lib, matchers, date) {
                continue;
            }
            if name == FOCUSED_MODIFIER {
                modifiers.focused = true;
            } else {
                modifiers.custom.insert(name.clone());
            }
        }
        modifiers
    }
}

/// Modifier bag of every cell of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierTable {
    days:   HashMap<DayKey, Modifiers>,
    pinned: BTreeSet<DayKey>,
}

impl ModifierTable {
    pub fn get(&self, key: &DayKey) -> Option<&Modifiers> {
        self.days.get(key)
    }

    /// Modifiers of a cell; a cell outside the grid carries none.
    pub fn for_day<D: Clone>(&self, day: &CalendarDay<D>) -> Modifiers {
        self.days.get(&day.key()).cloned().unwrap_or_default()
    }

    /// Keys of the cells carrying `name`, in date order.
    pub fn days_with(&self, name: &str) -> Vec<DayKey> {
        let mut keys: Vec<_> = self
            .days
            .iter()
            .filter(|(_, modifiers)| modifiers.get(name))
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// The cell carries the `focused` custom modifier. Unlike
    /// [`Modifiers::focused`] this ignores the focus set by [`Self::apply_focus`].
    pub fn is_pinned(&self, key: &DayKey) -> bool {
        self.pinned.contains(key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sets the selection-derived flags.
    pub fn apply_selection<C>(&mut self, lib: &C, months: &[CalendarMonth<C::Date>], selector: &Selector<C::Date>)
    where
        C: DateCapability,
    {
        let range = match selector {
            Selector::Range(range) => Some(range.state()),
            Selector::Single(_) | Selector::Multiple(_) => None,
        };
        for day in all_days(months) {
            let Some(modifiers) = self.days.get_mut(&day.key()) else {
                continue;
            };
            let date = day.date();
            modifiers.selected = selector.is_selected(lib, date);
            let (start, middle, end) = match range {
                Some(RangeSelection::Open { from }) => (lib.is_same_day(date, from), false, false),
                Some(RangeSelection::Closed(range)) => {
                    let start = lib.is_same_day(date, range.from());
                    let end = lib.is_same_day(date, range.to());
                    let middle = !start && !end && range.contains(lib, date);
                    (start, middle, end)
                },
                Some(RangeSelection::Empty) | None => (false, false, false),
            };
            modifiers.range_start = start;
            modifiers.range_middle = middle;
            modifiers.range_end = end;
        }
    }

    /// Marks the focused cell, clearing focus annotations left by a previous
    /// call. Cells pinned by the `focused` custom modifier keep their flag.
    pub fn apply_focus(&mut self, focused: Option<DayKey>) {
        for (key, modifiers) in &mut self.days {
            modifiers.focused = self.pinned.contains(key) || focused == Some(*key);
        }
    }
}

/// Classifies every cell of `months`.
pub fn compile<C>(lib: &C, months: &[CalendarMonth<C::Date>], context: &ModifierContext<'_, C::Date>) -> ModifierTable
where
    C: DateCapability,
{
    let days: HashMap<_, _> = all_days(months)
        .map(|day| (day.key(), context.classify(lib, day)))
        .collect();
    let pinned = days
        .iter()
        .filter(|(_, modifiers)| modifiers.focused)
        .map(|(key, _)| *key)
        .collect();
    debug!(
        days = days.len(),
        disabled = days.values().filter(|modifiers| modifiers.disabled).count(),
        hidden = days.values().filter(|modifiers| modifiers.hidden).count(),
        "modifiers compiled"
    );
    ModifierTable { days, pinned }
}
