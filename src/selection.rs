//! Selection state machines.
//!
//! Every `activate` is a pure transition returning the next selector; the
//! calendar facade swaps the value in and notifies listeners.

use crate::capability::DateCapability;
use crate::config::{SelectionConfig, SelectionMode};
use crate::range::DateRange;
use tracing::trace;

/// At most one selected day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelector<D> {
    selected: Option<D>,
    required: bool,
}

impl<D: Clone> SingleSelector<D> {
    pub const fn new(required: bool) -> Self {
        Self {
            selected: None,
            required,
        }
    }

    #[must_use]
    pub fn with_selected(mut self, selected: Option<D>) -> Self {
        self.selected = selected;
        self
    }

    pub const fn selected(&self) -> Option<&D> {
        self.selected.as_ref()
    }

    pub fn is_selected<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        self.selected
            .as_ref()
            .is_some_and(|selected| lib.is_same_day(selected, date))
    }

    /// Re-activating the selected day clears it unless a selection is required.
    #[must_use]
    pub fn activate<C>(&self, lib: &C, date: D) -> Self
    where
        C: DateCapability<Date = D>,
    {
        let selected = if self.is_selected(lib, &date) && !self.required {
            None
        } else {
            Some(date)
        };
        Self {
            selected,
            required: self.required,
        }
    }
}

/// Any number of days, kept in activation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleSelector<D> {
    selected: Vec<D>,
    required: bool,
    min:      Option<u32>,
    max:      Option<u32>,
}

impl<D: Clone> MultipleSelector<D> {
    pub const fn new(required: bool, min: Option<u32>, max: Option<u32>) -> Self {
        Self {
            selected: Vec::new(),
            required,
            min,
            max,
        }
    }

    #[must_use]
    pub fn with_selected(mut self, selected: Vec<D>) -> Self {
        self.selected = selected;
        self
    }

    pub fn selected(&self) -> &[D] {
        &self.selected
    }

    pub fn is_selected<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        self.selected.iter().any(|selected| lib.is_same_day(selected, date))
    }

    /// Toggles `date`.
    ///
    /// Removing is refused when it would drop below `min` or empty a
    /// required selection. Adding to a full selection starts over with
    /// `date` alone.
    #[must_use]
    pub fn activate<C>(&self, lib: &C, date: D) -> Self
    where
        C: DateCapability<Date = D>,
    {
        let count = self.selected.len();
        let selected = if self.is_selected(lib, &date) {
            let at_min = self.min.is_some_and(|min| count <= min as usize);
            if at_min || (self.required && count == 1) {
                trace!(count, "removal refused");
                return self.clone();
            }
            self.selected
                .iter()
                .filter(|selected| !lib.is_same_day(selected, &date))
                .cloned()
                .collect()
        } else if self.max.is_some_and(|max| count >= max as usize) {
            trace!(count, "selection full, starting over");
            vec![date]
        } else {
            let mut selected = self.selected.clone();
            selected.push(date);
            selected
        };
        Self {
            selected,
            ..self.clone()
        }
    }
}

/// Progress of a range selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RangeSelection<D> {
    #[default]
    Empty,
    /// Anchored, waiting for the other end.
    Open { from: D },
    Closed(DateRange<D>),
}

impl<D> RangeSelection<D> {
    pub const fn from(&self) -> Option<&D> {
        match self {
            Self::Empty => None,
            Self::Open { from } => Some(from),
            Self::Closed(range) => Some(range.from()),
        }
    }

    pub const fn to(&self) -> Option<&D> {
        match self {
            Self::Closed(range) => Some(range.to()),
            Self::Empty | Self::Open { .. } => None,
        }
    }
}

/// A contiguous span of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector<D> {
    state:            RangeSelection<D>,
    required:         bool,
    min:              Option<u32>,
    max:              Option<u32>,
    exclude_disabled: bool,
}

impl<D: Clone + Ord> RangeSelector<D> {
    pub const fn new(required: bool, min: Option<u32>, max: Option<u32>, exclude_disabled: bool) -> Self {
        Self {
            state: RangeSelection::Empty,
            required,
            min,
            max,
            exclude_disabled,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: RangeSelection<D>) -> Self {
        self.state = state;
        self
    }

    pub const fn state(&self) -> &RangeSelection<D> {
        &self.state
    }

    /// Single-day ranges are allowed.
    const fn allows_zero_length(&self) -> bool {
        matches!(self.min, Some(0))
    }

    pub fn is_selected<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        match &self.state {
            RangeSelection::Empty => false,
            RangeSelection::Open { from } => lib.is_same_day(from, date),
            RangeSelection::Closed(range) => range.contains(lib, date),
        }
    }

    /// Advances the range with `date`; `is_disabled` is consulted only when
    /// disabled days may not be spanned.
    ///
    /// # Panics
    /// Panics if a transition would produce an inverted range.
    #[must_use]
    pub fn activate<C>(&self, lib: &C, date: D, is_disabled: impl Fn(&D) -> bool) -> Self
    where
        C: DateCapability<Date = D>,
    {
        let state = match &self.state {
            RangeSelection::Empty => {
                if self.allows_zero_length() {
                    RangeSelection::Closed(DateRange::ordered(date.clone(), date))
                } else {
                    RangeSelection::Open { from: date }
                }
            },
            RangeSelection::Open { from } => {
                if lib.is_same_day(from, &date) {
                    if self.allows_zero_length() {
                        RangeSelection::Closed(DateRange::ordered(from.clone(), from.clone()))
                    } else {
                        RangeSelection::Open { from: date }
                    }
                } else if lib.is_before(&date, from) {
                    self.complete(lib, date.clone(), from.clone(), &date, &is_disabled)
                } else {
                    self.complete(lib, from.clone(), date.clone(), &date, &is_disabled)
                }
            },
            RangeSelection::Closed(range) => {
                let (from, to) = range.dates();
                if lib.is_same_day(from, &date) || lib.is_same_day(to, &date) {
                    if self.required && lib.is_same_day(from, to) {
                        trace!("required single-day range kept");
                        return self.clone();
                    }
                    RangeSelection::Open { from: date }
                } else if lib.is_before(&date, from) {
                    RangeSelection::Open { from: date }
                } else {
                    self.complete(lib, from.clone(), date.clone(), &date, &is_disabled)
                }
            },
        };
        Self {
            state,
            ..self.clone()
        }
    }

    fn complete<C>(
        &self,
        lib: &C,
        from: D,
        to: D,
        trigger: &D,
        is_disabled: &impl Fn(&D) -> bool,
    ) -> RangeSelection<D>
    where
        C: DateCapability<Date = D>,
    {
        let range = DateRange::ordered(from, to);
        let span = range.span_days(lib);
        let too_short = self.min.is_some_and(|min| span < i64::from(min));
        let too_long = self.max.is_some_and(|max| span > i64::from(max));
        let spans_disabled = self.exclude_disabled && range.days(lib).any(|day| is_disabled(&day));
        if too_short || too_long || spans_disabled {
            trace!(span, too_short, too_long, spans_disabled, "range restarted");
            return RangeSelection::Open {
                from: trigger.clone(),
            };
        }
        RangeSelection::Closed(range)
    }
}

/// Current selection value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<D> {
    Single(Option<D>),
    Multiple(Vec<D>),
    Range(RangeSelection<D>),
}

impl<D> Selection<D> {
    pub const fn mode(&self) -> SelectionMode {
        match self {
            Self::Single(_) => SelectionMode::Single,
            Self::Multiple(_) => SelectionMode::Multiple,
            Self::Range(_) => SelectionMode::Range,
        }
    }

    /// Nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(selected) => selected.is_none(),
            Self::Multiple(selected) => selected.is_empty(),
            Self::Range(range) => matches!(range, RangeSelection::Empty),
        }
    }
}

/// A selection mode with its state, fixed when the calendar is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<D> {
    Single(SingleSelector<D>),
    Multiple(MultipleSelector<D>),
    Range(RangeSelector<D>),
}

impl<D: Clone + Ord> Selector<D> {
    pub const fn from_config(config: &SelectionConfig) -> Self {
        match config.mode {
            SelectionMode::Single => Self::Single(SingleSelector::new(config.required)),
            SelectionMode::Multiple => Self::Multiple(MultipleSelector::new(config.required, config.min, config.max)),
            SelectionMode::Range => Self::Range(RangeSelector::new(
                config.required,
                config.min,
                config.max,
                config.exclude_disabled,
            )),
        }
    }

    pub const fn mode(&self) -> SelectionMode {
        match self {
            Self::Single(_) => SelectionMode::Single,
            Self::Multiple(_) => SelectionMode::Multiple,
            Self::Range(_) => SelectionMode::Range,
        }
    }

    pub fn is_selected<C>(&self, lib: &C, date: &D) -> bool
    where
        C: DateCapability<Date = D>,
    {
        match self {
            Self::Single(selector) => selector.is_selected(lib, date),
            Self::Multiple(selector) => selector.is_selected(lib, date),
            Self::Range(selector) => selector.is_selected(lib, date),
        }
    }

    #[must_use]
    pub fn activate<C>(&self, lib: &C, date: D, is_disabled: impl Fn(&D) -> bool) -> Self
    where
        C: DateCapability<Date = D>,
    {
        match self {
            Self::Single(selector) => Self::Single(selector.activate(lib, date)),
            Self::Multiple(selector) => Self::Multiple(selector.activate(lib, date)),
            Self::Range(selector) => Self::Range(selector.activate(lib, date, is_disabled)),
        }
    }

    pub fn selection(&self) -> Selection<D> {
        match self {
            Self::Single(selector) => Selection::Single(selector.selected.clone()),
            Self::Multiple(selector) => Selection::Multiple(selector.selected.clone()),
            Self::Range(selector) => Selection::Range(selector.state.clone()),
        }
    }

    /// Replaces the state, keeping the mode and its constraints.
    ///
    /// Returns `None` when `selection` belongs to another mode.
    #[must_use]
    pub fn with_selection(&self, selection: Selection<D>) -> Option<Self> {
        match (self, selection) {
            (Self::Single(selector), Selection::Single(selected)) => {
                Some(Self::Single(selector.clone().with_selected(selected)))
            },
            (Self::Multiple(selector), Selection::Multiple(selected)) => {
                Some(Self::Multiple(selector.clone().with_selected(selected)))
            },
            (Self::Range(selector), Selection::Range(state)) => Some(Self::Range(selector.clone().with_state(state))),
            _ => None,
        }
    }

    /// Clears the selection.
    #[must_use]
    pub fn reset(&self) -> Self {
        match self {
            Self::Single(selector) => Self::Single(selector.clone().with_selected(None)),
            Self::Multiple(selector) => Self::Multiple(selector.clone().with_selected(Vec::new())),
            Self::Range(selector) => Self::Range(selector.clone().with_state(RangeSelection::Empty)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NaiveCalendar;
    use crate::test_utils::{at, ymd};
    use chrono::NaiveDateTime;

    fn range_selector(config: SelectionConfig) -> RangeSelector<NaiveDateTime> {
        match Selector::from_config(&SelectionConfig {
            mode: SelectionMode::Range,
            ..config
        }) {
            Selector::Range(selector) => selector,
            other => panic!("expected a range selector, got {other:?}"),
        }
    }

    fn closed(from: NaiveDateTime, to: NaiveDateTime) -> RangeSelection<NaiveDateTime> {
        RangeSelection::Closed(DateRange::ordered(from, to))
    }

    #[test]
    fn test_single() {
        let lib = NaiveCalendar::new();
        let selector = SingleSelector::new(false);
        let selector = selector.activate(&lib, ymd(2024, 5, 1));
        assert!(selector.is_selected(&lib, &at(2024, 5, 1, 18, 0)));

        let replaced = selector.activate(&lib, ymd(2024, 5, 2));
        assert_eq!(replaced.selected(), Some(&ymd(2024, 5, 2)));

        let cleared = selector.activate(&lib, ymd(2024, 5, 1));
        assert_eq!(cleared.selected(), None);

        let required = SingleSelector::new(true).activate(&lib, ymd(2024, 5, 1));
        let kept = required.activate(&lib, ymd(2024, 5, 1));
        assert_eq!(kept.selected(), Some(&ymd(2024, 5, 1)));
    }

    #[test]
    fn test_multiple_toggle_order() {
        let lib = NaiveCalendar::new();
        let selector = MultipleSelector::new(false, None, None)
            .activate(&lib, ymd(2024, 5, 3))
            .activate(&lib, ymd(2024, 5, 1))
            .activate(&lib, ymd(2024, 5, 2));
        assert_eq!(selector.selected(), &[ymd(2024, 5, 3), ymd(2024, 5, 1), ymd(2024, 5, 2)]);

        let selector = selector.activate(&lib, ymd(2024, 5, 1));
        assert_eq!(selector.selected(), &[ymd(2024, 5, 3), ymd(2024, 5, 2)]);
    }

    #[test]
    fn test_multiple_max_starts_over() {
        let lib = NaiveCalendar::new();
        let selector = MultipleSelector::new(false, None, Some(2))
            .activate(&lib, ymd(2024, 5, 1))
            .activate(&lib, ymd(2024, 5, 2))
            .activate(&lib, ymd(2024, 5, 3));
        assert_eq!(selector.selected(), &[ymd(2024, 5, 3)]);
    }

    #[test]
    fn test_multiple_min_and_required() {
        let lib = NaiveCalendar::new();
        let selector = MultipleSelector::new(false, Some(2), None)
            .activate(&lib, ymd(2024, 5, 1))
            .activate(&lib, ymd(2024, 5, 2));
        let unchanged = selector.activate(&lib, ymd(2024, 5, 1));
        assert_eq!(unchanged, selector);

        let selector = MultipleSelector::new(true, None, None).activate(&lib, ymd(2024, 5, 1));
        assert_eq!(selector.activate(&lib, ymd(2024, 5, 1)).selected().len(), 1);

        let selector = MultipleSelector::new(false, None, None).activate(&lib, ymd(2024, 5, 1));
        assert!(selector.activate(&lib, ymd(2024, 5, 1)).selected().is_empty());
    }

    #[test]
    fn test_range_transitions() {
        struct TestCase {
            start:       RangeSelection<NaiveDateTime>,
            activate:    NaiveDateTime,
            expected:    RangeSelection<NaiveDateTime>,
            description: &'static str,
        }

        let cases = [
            TestCase {
                start:       RangeSelection::Empty,
                activate:    ymd(2024, 5, 10),
                expected:    RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                description: "first click anchors",
            },
            TestCase {
                start:       RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                activate:    ymd(2024, 5, 14),
                expected:    closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                description: "later click completes",
            },
            TestCase {
                start:       RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                activate:    ymd(2024, 5, 7),
                expected:    closed(ymd(2024, 5, 7), ymd(2024, 5, 10)),
                description: "earlier click swaps",
            },
            TestCase {
                start:       RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                activate:    ymd(2024, 5, 10),
                expected:    RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                description: "same day keeps anchor",
            },
            TestCase {
                start:       closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                activate:    ymd(2024, 5, 14),
                expected:    RangeSelection::Open {
                    from: ymd(2024, 5, 14),
                },
                description: "end re-opens",
            },
            TestCase {
                start:       closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                activate:    ymd(2024, 5, 10),
                expected:    RangeSelection::Open {
                    from: ymd(2024, 5, 10),
                },
                description: "start re-opens",
            },
            TestCase {
                start:       closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                activate:    ymd(2024, 5, 2),
                expected:    RangeSelection::Open {
                    from: ymd(2024, 5, 2),
                },
                description: "before start restarts",
            },
            TestCase {
                start:       closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                activate:    ymd(2024, 5, 12),
                expected:    closed(ymd(2024, 5, 10), ymd(2024, 5, 12)),
                description: "inside shrinks",
            },
            TestCase {
                start:       closed(ymd(2024, 5, 10), ymd(2024, 5, 14)),
                activate:    ymd(2024, 5, 20),
                expected:    closed(ymd(2024, 5, 10), ymd(2024, 5, 20)),
                description: "after extends",
            },
        ];

        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig::default());
        for case in cases {
            let next = selector
                .clone()
                .with_state(case.start)
                .activate(&lib, case.activate, |_| false);
            assert_eq!(next.state(), &case.expected, "failed: {}", case.description);
        }
    }

    #[test]
    fn test_range_zero_length_allowed() {
        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig {
            min: Some(0),
            ..SelectionConfig::default()
        });
        let next = selector.activate(&lib, ymd(2024, 5, 10), |_| false);
        assert_eq!(next.state(), &closed(ymd(2024, 5, 10), ymd(2024, 5, 10)));

        let open = selector.with_state(RangeSelection::Open {
            from: ymd(2024, 5, 10),
        });
        let next = open.activate(&lib, ymd(2024, 5, 10), |_| false);
        assert_eq!(next.state(), &closed(ymd(2024, 5, 10), ymd(2024, 5, 10)));
    }

    #[test]
    fn test_range_required_single_day_kept() {
        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig {
            required: true,
            min: Some(0),
            ..SelectionConfig::default()
        })
        .with_state(closed(ymd(2024, 5, 10), ymd(2024, 5, 10)));
        let next = selector.activate(&lib, ymd(2024, 5, 10), |_| false);
        assert_eq!(next, selector);
    }

    #[test]
    fn test_range_span_limits() {
        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig {
            min: Some(2),
            max: Some(5),
            ..SelectionConfig::default()
        })
        .with_state(RangeSelection::Open {
            from: ymd(2024, 5, 10),
        });

        let short = selector.activate(&lib, ymd(2024, 5, 11), |_| false);
        assert_eq!(short.state(), &RangeSelection::Open { from: ymd(2024, 5, 11) });

        let long = selector.activate(&lib, ymd(2024, 5, 16), |_| false);
        assert_eq!(long.state(), &RangeSelection::Open { from: ymd(2024, 5, 16) });

        let fits = selector.activate(&lib, ymd(2024, 5, 15), |_| false);
        assert_eq!(fits.state(), &closed(ymd(2024, 5, 10), ymd(2024, 5, 15)));
    }

    #[test]
    fn test_range_exclude_disabled() {
        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig {
            exclude_disabled: true,
            ..SelectionConfig::default()
        })
        .with_state(RangeSelection::Open {
            from: ymd(2024, 5, 10),
        });
        let blocked = ymd(2024, 5, 12);
        let next = selector.activate(&lib, ymd(2024, 5, 14), |day| *day == blocked);
        assert_eq!(next.state(), &RangeSelection::Open { from: ymd(2024, 5, 14) });

        let next = selector.activate(&lib, ymd(2024, 5, 11), |day| *day == blocked);
        assert_eq!(next.state(), &closed(ymd(2024, 5, 10), ymd(2024, 5, 11)));
    }

    #[test]
    fn test_range_is_selected_inclusive() {
        let lib = NaiveCalendar::new();
        let selector = range_selector(SelectionConfig::default()).with_state(closed(ymd(2024, 5, 10), ymd(2024, 5, 14)));
        assert!(selector.is_selected(&lib, &ymd(2024, 5, 10)));
        assert!(selector.is_selected(&lib, &at(2024, 5, 14, 23, 0)));
        assert!(!selector.is_selected(&lib, &ymd(2024, 5, 15)));
        assert!(!selector.is_selected(&lib, &ymd(2024, 5, 9)));
    }

    #[test]
    fn test_selector_dispatch_and_reset() {
        let lib = NaiveCalendar::new();
        let config = SelectionConfig {
            mode: SelectionMode::Multiple,
            ..SelectionConfig::default()
        };
        let selector = Selector::from_config(&config).activate(&lib, ymd(2024, 5, 1), |_| false);
        assert_eq!(selector.mode(), SelectionMode::Multiple);
        assert_eq!(selector.selection(), Selection::Multiple(vec![ymd(2024, 5, 1)]));
        assert!(selector.reset().selection().is_empty());

        assert!(selector.with_selection(Selection::Single(None)).is_none());
        let restored = selector
            .with_selection(Selection::Multiple(vec![ymd(2024, 6, 1), ymd(2024, 6, 2)]))
            .unwrap();
        assert!(restored.is_selected(&lib, &ymd(2024, 6, 2)));
        assert_eq!(restored.selection().mode(), SelectionMode::Multiple);
    }
}
