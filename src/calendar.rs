//! The calendar facade.
//!
//! `Calendar` owns the displayed month, the built grid, the compiled
//! modifiers, the selection and the focus. Each operation computes the next
//! value with the pure functions of the other modules and swaps it in.

use crate::CalendarError;
use crate::capability::DateCapability;
use crate::config::{CalendarConfig, GridConfig, SelectionConfig};
use crate::focus::{self, FocusContext, FocusDirection, FocusUnit};
use crate::grid::{self, CalendarDay, CalendarMonth, CalendarWeek, all_days, all_weeks};
use crate::matcher::{Matcher, matches_any};
use crate::modifiers::{DayMatchers, ModifierContext, ModifierTable, Modifiers, compile};
use crate::navigation::{self, NavBounds, NavOptions};
use crate::selection::{Selection, Selector};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// Called with the new selection and the activated date.
pub type SelectListener<D> = Box<dyn FnMut(&Selection<D>, &D)>;

/// Called with the new first displayed month.
pub type MonthListener<D> = Box<dyn FnMut(&D)>;

/// Everything that shapes a calendar.
#[derive(Debug, Clone)]
pub struct CalendarOptions<D> {
    pub grid:               GridConfig,
    pub selection:          SelectionConfig,
    /// Month shown first when the calendar opens; defaults to today's.
    pub default_month:      Option<D>,
    pub start_month:        Option<D>,
    pub end_month:          Option<D>,
    /// Reference for the `today` modifier; defaults to the capability's clock.
    pub today:              Option<D>,
    pub show_outside_days:  bool,
    pub paged_navigation:   bool,
    pub disable_navigation: bool,
    pub matchers:           DayMatchers<D>,
    /// Initial selection; must match the selection mode.
    pub selected:           Option<Selection<D>>,
}

impl<D> Default for CalendarOptions<D> {
    fn default() -> Self {
        Self {
            grid:               GridConfig::default(),
            selection:          SelectionConfig::default(),
            default_month:      None,
            start_month:        None,
            end_month:          None,
            today:              None,
            show_outside_days:  false,
            paged_navigation:   false,
            disable_navigation: false,
            matchers:           DayMatchers::default(),
            selected:           None,
        }
    }
}

impl<D: Clone + Ord> CalendarOptions<D> {
    #[must_use]
    pub const fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub const fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_default_month(mut self, month: D) -> Self {
        self.default_month = Some(month);
        self
    }

    #[must_use]
    pub fn with_start_month(mut self, month: D) -> Self {
        self.start_month = Some(month);
        self
    }

    #[must_use]
    pub fn with_end_month(mut self, month: D) -> Self {
        self.end_month = Some(month);
        self
    }

    #[must_use]
    pub fn with_today(mut self, today: D) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub const fn with_show_outside_days(mut self, show: bool) -> Self {
        self.show_outside_days = show;
        self
    }

    #[must_use]
    pub const fn with_paged_navigation(mut self, paged: bool) -> Self {
        self.paged_navigation = paged;
        self
    }

    #[must_use]
    pub const fn with_disable_navigation(mut self, disable: bool) -> Self {
        self.disable_navigation = disable;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, matcher: Matcher<D>) -> Self {
        self.matchers.disabled.push(matcher);
        self
    }

    #[must_use]
    pub fn with_hidden(mut self, matcher: Matcher<D>) -> Self {
        self.matchers.hidden.push(matcher);
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, name: impl Into<String>, matcher: Matcher<D>) -> Self {
        self.matchers.custom.entry(name.into()).or_default().push(matcher);
        self
    }

    #[must_use]
    pub fn with_selected(mut self, selected: Selection<D>) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Converts a serialized configuration into typed options.
    ///
    /// # Errors
    /// Returns the first error of [`CalendarConfig::validate`] or of a
    /// matcher that cannot be built.
    pub fn from_config<C>(lib: &C, config: &CalendarConfig) -> Result<Self, CalendarError>
    where
        C: DateCapability<Date = D>,
    {
        config.validate()?;
        let custom = config
            .modifiers
            .iter()
            .map(|(name, matchers)| -> Result<_, CalendarError> {
                Ok((name.clone(), Matcher::from_configs(lib, matchers)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let date = |date: Option<chrono::NaiveDate>| date.map(|date| lib.from_calendar_date(date));

        Ok(Self {
            grid:               config.grid,
            selection:          config.selection,
            default_month:      date(config.default_month),
            start_month:        date(config.start_month),
            end_month:          date(config.end_month),
            today:              date(config.today),
            show_outside_days:  config.show_outside_days,
            paged_navigation:   config.paged_navigation,
            disable_navigation: config.disable_navigation,
            matchers:           DayMatchers {
                disabled: Matcher::from_configs(lib, &config.disabled)?,
                hidden: Matcher::from_configs(lib, &config.hidden)?,
                custom,
            },
            selected:           None,
        })
    }

    const fn nav_options(&self) -> NavOptions {
        NavOptions {
            number_of_months:   self.grid.number_of_months.get(),
            paged_navigation:   self.paged_navigation,
            disable_navigation: self.disable_navigation,
        }
    }
}

/// A month-view calendar with selection and keyboard focus.
pub struct Calendar<C: DateCapability> {
    lib:             C,
    options:         CalendarOptions<C::Date>,
    bounds:          NavBounds<C::Date>,
    today:           C::Date,
    first_month:     C::Date,
    months:          Vec<CalendarMonth<C::Date>>,
    table:           ModifierTable,
    selector:        Selector<C::Date>,
    focused:         Option<CalendarDay<C::Date>>,
    on_select:       Option<SelectListener<C::Date>>,
    on_month_change: Option<MonthListener<C::Date>>,
}

impl<C: DateCapability> Calendar<C> {
    /// Builds the calendar on its initial month.
    ///
    /// # Errors
    /// Returns `CalendarError::Configuration` for inconsistent options or an
    /// initial selection of another mode, and any grid build error.
    pub fn new(lib: C, options: CalendarOptions<C::Date>) -> Result<Self, CalendarError> {
        let (bounds, today, selector) = Self::prepare(&lib, &options, None)?;
        let first_month = navigation::initial_month(
            &lib,
            options.default_month.as_ref(),
            &today,
            &bounds,
            options.grid.number_of_months.get(),
        );
        let mut calendar = Self {
            lib,
            options,
            bounds,
            today,
            first_month,
            months: Vec::new(),
            table: ModifierTable::default(),
            selector,
            focused: None,
            on_select: None,
            on_month_change: None,
        };
        calendar.rebuild()?;
        Ok(calendar)
    }

    /// Builds a calendar from a serialized configuration.
    ///
    /// # Errors
    /// As [`CalendarOptions::from_config`] and [`Calendar::new`].
    pub fn from_config(lib: C, config: &CalendarConfig) -> Result<Self, CalendarError> {
        let options = CalendarOptions::from_config(&lib, config)?;
        Self::new(lib, options)
    }

    fn prepare(
        lib: &C,
        options: &CalendarOptions<C::Date>,
        current: Option<&Selector<C::Date>>,
    ) -> Result<(NavBounds<C::Date>, C::Date, Selector<C::Date>), CalendarError> {
        options.grid.validate()?;
        options.selection.validate()?;
        if let (Some(start), Some(end)) = (&options.start_month, &options.end_month) {
            if lib.difference_in_calendar_months(end, start) < 0 {
                return Err(CalendarError::Configuration(format!(
                    "start month {} is after end month {}",
                    lib.to_iso_string(start),
                    lib.to_iso_string(end)
                )));
            }
        }

        let bounds = NavBounds::resolve(lib, options.start_month.as_ref(), options.end_month.as_ref());
        let today = options
            .today
            .as_ref()
            .map_or_else(|| lib.today(), |today| lib.start_of_day(today));

        let fresh = Selector::from_config(&options.selection);
        let selector = match (&options.selected, current) {
            (Some(selected), _) => fresh.with_selection(selected.clone()).ok_or_else(|| {
                CalendarError::Configuration(format!(
                    "initial selection is {} but the selection mode is {}",
                    selected.mode(),
                    options.selection.mode
                ))
            })?,
            (None, Some(current)) => fresh.with_selection(current.selection()).unwrap_or(fresh),
            (None, None) => fresh,
        };
        Ok((bounds, today, selector))
    }

    fn rebuild(&mut self) -> Result<(), CalendarError> {
        self.months = grid::build(
            &self.lib,
            &self.first_month,
            &self.options.grid,
            self.bounds.end.as_ref(),
        )?;
        let context = ModifierContext {
            matchers:          &self.options.matchers,
            bounds:            &self.bounds,
            show_outside_days: self.options.show_outside_days,
            broadcast:         self.options.grid.broadcast_calendar,
            today:             &self.today,
        };
        let table = compile(&self.lib, &self.months, &context);
        self.table = table;
        self.annotate();
        Ok(())
    }

    fn annotate(&mut self) {
        self.table.apply_selection(&self.lib, &self.months, &self.selector);
        self.table.apply_focus(self.focused.as_ref().map(CalendarDay::key));
    }

    pub const fn lib(&self) -> &C {
        &self.lib
    }

    pub const fn options(&self) -> &CalendarOptions<C::Date> {
        &self.options
    }

    pub const fn bounds(&self) -> &NavBounds<C::Date> {
        &self.bounds
    }

    pub const fn today(&self) -> &C::Date {
        &self.today
    }

    /// First day of the first displayed month.
    pub const fn first_month(&self) -> &C::Date {
        &self.first_month
    }

    pub fn months(&self) -> &[CalendarMonth<C::Date>] {
        &self.months
    }

    pub fn weeks(&self) -> impl Iterator<Item = &CalendarWeek<C::Date>> {
        all_weeks(&self.months)
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay<C::Date>> {
        all_days(&self.months)
    }

    /// Week-header dates in display order.
    pub fn weekdays(&self) -> Vec<C::Date> {
        grid::weekdays(&self.lib, &self.options.grid, &self.today)
    }

    pub const fn table(&self) -> &ModifierTable {
        &self.table
    }

    pub fn modifiers(&self, day: &CalendarDay<C::Date>) -> Modifiers {
        self.table.for_day(day)
    }

    pub fn is_day_displayed(&self, day: &CalendarDay<C::Date>) -> bool {
        self.days().any(|displayed| displayed == day)
    }

    pub const fn selector(&self) -> &Selector<C::Date> {
        &self.selector
    }

    pub fn selection(&self) -> Selection<C::Date> {
        self.selector.selection()
    }

    pub fn is_selected(&self, date: &C::Date) -> bool {
        self.selector.is_selected(&self.lib, date)
    }

    pub fn on_select(&mut self, listener: impl FnMut(&Selection<C::Date>, &C::Date) + 'static) {
        self.on_select = Some(Box::new(listener));
    }

    pub fn on_month_change(&mut self, listener: impl FnMut(&C::Date) + 'static) {
        self.on_month_change = Some(Box::new(listener));
    }

    /// Activates a day and returns the new selection.
    ///
    /// Disabled and hidden days are ignored, as are activations that leave
    /// the selection unchanged; both return `None` without notifying.
    pub fn activate(&mut self, day: &CalendarDay<C::Date>) -> Option<Selection<C::Date>> {
        let modifiers = self.modifiers(day);
        if modifiers.disabled || modifiers.hidden {
            trace!(date = %self.lib.to_iso_string(day.date()), "activation ignored");
            return None;
        }

        let disabled = &self.options.matchers.disabled;
        let next = self.selector.activate(&self.lib, day.date().clone(), |date| {
            matches_any(&self.lib, disabled, date)
        });
        if next == self.selector {
            return None;
        }
        self.selector = next;
        self.annotate();

        let selection = self.selector.selection();
        debug!(mode = %selection.mode(), date = %self.lib.to_iso_string(day.date()), "selection changed");
        if let Some(listener) = self.on_select.as_mut() {
            listener(&selection, day.date());
        }
        Some(selection)
    }

    /// Clears the selection without notifying.
    pub fn reset_selection(&mut self) {
        self.selector = self.selector.reset();
        self.annotate();
    }

    pub const fn focused(&self) -> Option<&CalendarDay<C::Date>> {
        self.focused.as_ref()
    }

    /// Day that takes focus when the grid gains it.
    pub fn focus_target(&self) -> Option<CalendarDay<C::Date>> {
        focus::initial_focus(
            self.days(),
            &self.table,
            |date| self.selector.is_selected(&self.lib, date),
            self.focused.as_ref(),
        )
    }

    /// Focuses a day; refused for days that cannot take focus.
    pub fn focus(&mut self, day: &CalendarDay<C::Date>) -> bool {
        if !self.modifiers(day).is_focusable() {
            return false;
        }
        self.focused = Some(day.clone());
        self.annotate();
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
        self.annotate();
    }

    /// Moves the focus, bringing the new day into view.
    ///
    /// Returns `Ok(None)` when nothing is focused or no focusable day is in
    /// reach.
    ///
    /// # Errors
    /// Returns the grid build error if paging fails.
    pub fn move_focus(
        &mut self,
        unit: FocusUnit,
        direction: FocusDirection,
    ) -> Result<Option<&CalendarDay<C::Date>>, CalendarError> {
        let Some(from) = self.focused.as_ref() else {
            return Ok(None);
        };
        let context = FocusContext {
            matchers: &self.options.matchers,
            bounds:   &self.bounds,
            grid:     &self.options.grid,
        };
        let Some(next) = focus::move_focus(&self.lib, unit, direction, from, &context) else {
            return Ok(None);
        };

        self.go_to_day(&next)?;
        self.focused = Some(next);
        self.annotate();
        Ok(self.focused.as_ref())
    }

    /// Month that [`Calendar::next_month`] would show first.
    pub fn next_month_target(&self) -> Option<C::Date> {
        navigation::next_month(&self.lib, &self.first_month, &self.bounds, &self.options.nav_options())
    }

    /// Month that [`Calendar::previous_month`] would show first.
    pub fn previous_month_target(&self) -> Option<C::Date> {
        navigation::previous_month(&self.lib, &self.first_month, &self.bounds, &self.options.nav_options())
    }

    /// Shows the next month (or page); `false` at the end bound.
    ///
    /// # Errors
    /// Returns the grid build error.
    pub fn next_month(&mut self) -> Result<bool, CalendarError> {
        match self.next_month_target() {
            Some(month) => self.go_to_month(&month).map(|()| true),
            None => Ok(false),
        }
    }

    /// Shows the previous month (or page); `false` at the start bound.
    ///
    /// # Errors
    /// Returns the grid build error.
    pub fn previous_month(&mut self) -> Result<bool, CalendarError> {
        match self.previous_month_target() {
            Some(month) => self.go_to_month(&month).map(|()| true),
            None => Ok(false),
        }
    }

    /// Shows `month` first, clamped into the navigable bounds.
    ///
    /// # Errors
    /// Returns the grid build error; the calendar keeps its previous month.
    pub fn go_to_month(&mut self, month: &C::Date) -> Result<(), CalendarError> {
        if self.options.disable_navigation {
            return Ok(());
        }
        let month = navigation::clamp_month(&self.lib, month, &self.bounds);
        if self.lib.is_same_month(&month, &self.first_month) {
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.first_month, month);
        if let Err(err) = self.rebuild() {
            self.first_month = previous;
            return Err(err);
        }
        debug!(month = %self.lib.to_iso_string(&self.first_month), "month changed");
        if let Some(listener) = self.on_month_change.as_mut() {
            listener(&self.first_month);
        }
        Ok(())
    }

    /// Brings a day into view unless it is already displayed.
    ///
    /// # Errors
    /// Returns the grid build error.
    pub fn go_to_day(&mut self, day: &CalendarDay<C::Date>) -> Result<(), CalendarError> {
        if self.is_day_displayed(day) {
            return Ok(());
        }
        self.go_to_month(day.date())
    }

    /// Replaces the options, keeping the selection when the mode is unchanged
    /// and the displayed month when the new bounds allow it.
    ///
    /// # Errors
    /// As [`Calendar::new`]; the calendar is unchanged on error.
    pub fn set_options(&mut self, options: CalendarOptions<C::Date>) -> Result<(), CalendarError> {
        let (bounds, today, selector) = Self::prepare(&self.lib, &options, Some(&self.selector))?;
        let first_month = navigation::clamp_month(&self.lib, &self.first_month, &bounds);

        let previous = (
            std::mem::replace(&mut self.options, options),
            std::mem::replace(&mut self.bounds, bounds),
            std::mem::replace(&mut self.today, today),
            std::mem::replace(&mut self.first_month, first_month),
            std::mem::replace(&mut self.selector, selector),
        );
        if let Err(err) = self.rebuild() {
            (self.options, self.bounds, self.today, self.first_month, self.selector) = previous;
            return Err(err);
        }
        Ok(())
    }
}

impl<C> fmt::Debug for Calendar<C>
where
    C: DateCapability + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("lib", &self.lib)
            .field("first_month", &self.first_month)
            .field("months", &self.months.len())
            .field("selector", &self.selector)
            .field("focused", &self.focused.as_ref().map(CalendarDay::key))
            .finish_non_exhaustive()
    }
}
