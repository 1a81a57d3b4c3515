//! Calendar configuration.
//!
//! `GridConfig` drives the grid builder directly. `CalendarConfig` is the
//! serializable form of a whole calendar (grid, bounds, selection mode and
//! matchers) and can be read from TOML:
//!
//! ```toml
//! start_month = "2024-01-01"
//! show_outside_days = true
//! disabled = [{ day_of_week = [0, 6] }, "2024-12-24/2024-12-26"]
//!
//! [grid]
//! number_of_months = 2
//! iso_week = true
//!
//! [selection]
//! mode = "range"
//! max = 14
//! ```

use crate::consts::{
    BROADCAST_FIXED_WEEKS_DAYS, FIRST_WEEK_CONTAINS_JAN_1, FIRST_WEEK_CONTAINS_JAN_4,
    FIXED_WEEKS_DAYS,
};
use crate::prelude::*;
use crate::types::{DayOfWeek, MonthCount};
use crate::CalendarError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Layout of the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub number_of_months:         MonthCount,
    pub fixed_weeks:              bool,
    pub iso_week:                 bool,
    pub broadcast_calendar:       bool,
    pub reverse_months:           bool,
    pub week_starts_on:           DayOfWeek,
    pub first_week_contains_date: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            number_of_months:         MonthCount::ONE,
            fixed_weeks:              false,
            iso_week:                 false,
            broadcast_calendar:       false,
            reverse_months:           false,
            week_starts_on:           DayOfWeek::SUNDAY,
            first_week_contains_date: FIRST_WEEK_CONTAINS_JAN_1,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub const fn with_number_of_months(mut self, count: MonthCount) -> Self {
        self.number_of_months = count;
        self
    }

    #[must_use]
    pub const fn with_fixed_weeks(mut self, fixed: bool) -> Self {
        self.fixed_weeks = fixed;
        self
    }

    #[must_use]
    pub const fn with_iso_week(mut self, iso: bool) -> Self {
        self.iso_week = iso;
        self
    }

    #[must_use]
    pub const fn with_broadcast_calendar(mut self, broadcast: bool) -> Self {
        self.broadcast_calendar = broadcast;
        self
    }

    #[must_use]
    pub const fn with_reverse_months(mut self, reverse: bool) -> Self {
        self.reverse_months = reverse;
        self
    }

    #[must_use]
    pub const fn with_week_starts_on(mut self, day: DayOfWeek) -> Self {
        self.week_starts_on = day;
        self
    }

    #[must_use]
    pub const fn with_first_week_contains_date(mut self, day: u8) -> Self {
        self.first_week_contains_date = day;
        self
    }

    /// ISO weeks are in effect (broadcast mode overrides them).
    pub const fn uses_iso_weeks(&self) -> bool {
        self.iso_week && !self.broadcast_calendar
    }

    /// First day of every grid row.
    pub const fn effective_week_start(&self) -> DayOfWeek {
        if self.broadcast_calendar || self.iso_week {
            DayOfWeek::MONDAY
        } else {
            self.week_starts_on
        }
    }

    /// Cells per month when `fixed_weeks` is set.
    pub const fn fixed_days_per_month(&self) -> usize {
        if self.broadcast_calendar {
            BROADCAST_FIXED_WEEKS_DAYS
        } else {
            FIXED_WEEKS_DAYS
        }
    }

    /// # Errors
    /// Returns `CalendarError::Configuration` for an unsupported week-one rule.
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.first_week_contains_date != FIRST_WEEK_CONTAINS_JAN_1
            && self.first_week_contains_date != FIRST_WEEK_CONTAINS_JAN_4
        {
            return Err(CalendarError::Configuration(format!(
                "first_week_contains_date must be {FIRST_WEEK_CONTAINS_JAN_1} or {FIRST_WEEK_CONTAINS_JAN_4}, got {}",
                self.first_week_contains_date
            )));
        }
        Ok(())
    }
}

/// How day activation changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    #[display(fmt = "single")]
    Single,
    #[display(fmt = "multiple")]
    Multiple,
    #[display(fmt = "range")]
    Range,
}

/// Selection mode and its constraints.
///
/// `min` / `max` count dates in multiple mode and calendar days of span in
/// range mode. In range mode `min = Some(0)` allows single-day ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub mode:             SelectionMode,
    pub required:         bool,
    pub min:              Option<u32>,
    pub max:              Option<u32>,
    pub exclude_disabled: bool,
}

impl SelectionConfig {
    /// # Errors
    /// Returns `CalendarError::Configuration` when `max` is zero, `min`
    /// exceeds `max`, or `exclude_disabled` is set outside range mode.
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.max == Some(0) {
            return Err(CalendarError::Configuration(format!(
                "selection max must be at least 1 in {} mode",
                self.mode
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(CalendarError::Configuration(format!(
                    "selection min ({min}) is greater than max ({max})"
                )));
            }
        }
        if self.exclude_disabled && self.mode != SelectionMode::Range {
            return Err(CalendarError::Configuration(format!(
                "exclude_disabled only applies to range selection, mode is {}",
                self.mode
            )));
        }
        Ok(())
    }
}

/// Serializable matcher.
///
/// A string is a calendar date (`2024-12-25`) or an ISO interval
/// (`2024-12-24/2024-12-26`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatcherConfig {
    Flag(bool),
    Date(String),
    DayOfWeek {
        day_of_week: Vec<DayOfWeek>,
    },
    Bounds {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after:  Option<NaiveDate>,
    },
}

/// Complete serializable description of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub grid:               GridConfig,
    pub selection:          SelectionConfig,
    /// Month shown first when the calendar opens; defaults to today's.
    pub default_month:      Option<NaiveDate>,
    /// First navigable month.
    pub start_month:        Option<NaiveDate>,
    /// Last navigable month.
    pub end_month:          Option<NaiveDate>,
    /// Overrides the capability's clock for the `today` modifier.
    pub today:              Option<NaiveDate>,
    pub show_outside_days:  bool,
    pub paged_navigation:   bool,
    pub disable_navigation: bool,
    pub disabled:           Vec<MatcherConfig>,
    pub hidden:             Vec<MatcherConfig>,
    pub modifiers:          BTreeMap<String, Vec<MatcherConfig>>,
}

impl CalendarConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns `CalendarError::Toml` for malformed input and
    /// `CalendarError::Configuration` for inconsistent settings.
    pub fn from_toml_str(input: &str) -> Result<Self, CalendarError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        debug!(
            months = config.grid.number_of_months.get(),
            mode = %config.selection.mode,
            disabled = config.disabled.len(),
            custom = config.modifiers.len(),
            "calendar config parsed"
        );
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    /// Returns `CalendarError::Io` when the file cannot be read, otherwise
    /// as [`CalendarConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalendarError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading calendar config");
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// # Errors
    /// Returns `CalendarError::Configuration` for inconsistent settings.
    pub fn validate(&self) -> Result<(), CalendarError> {
        self.grid.validate()?;
        self.selection.validate()?;
        if let (Some(start), Some(end)) = (self.start_month, self.end_month) {
            if start > end {
                return Err(CalendarError::Configuration(format!(
                    "start_month ({start}) is after end_month ({end})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_defaults() {
        let grid = GridConfig::default();
        assert_eq!(grid.number_of_months.get(), 1);
        assert_eq!(grid.week_starts_on, DayOfWeek::SUNDAY);
        assert_eq!(grid.effective_week_start(), DayOfWeek::SUNDAY);
        assert_eq!(grid.fixed_days_per_month(), 42);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_broadcast_overrides_iso() {
        let grid = GridConfig::default()
            .with_iso_week(true)
            .with_broadcast_calendar(true);
        assert!(!grid.uses_iso_weeks());
        assert_eq!(grid.effective_week_start(), DayOfWeek::MONDAY);
        assert_eq!(grid.fixed_days_per_month(), 35);
    }

    #[test]
    fn test_grid_rejects_unknown_week_one_rule() {
        let grid = GridConfig::default().with_first_week_contains_date(3);
        assert!(matches!(grid.validate(), Err(CalendarError::Configuration(_))));
    }

    #[test]
    fn test_selection_validation() {
        struct TestCase {
            config:      SelectionConfig,
            valid:       bool,
            description: &'static str,
        }

        let cases = [
            TestCase {
                config:      SelectionConfig::default(),
                valid:       true,
                description: "defaults",
            },
            TestCase {
                config:      SelectionConfig {
                    mode: SelectionMode::Multiple,
                    min: Some(3),
                    max: Some(2),
                    ..SelectionConfig::default()
                },
                valid:       false,
                description: "min above max",
            },
            TestCase {
                config:      SelectionConfig {
                    mode: SelectionMode::Multiple,
                    max: Some(0),
                    ..SelectionConfig::default()
                },
                valid:       false,
                description: "multiple with zero max",
            },
            TestCase {
                config:      SelectionConfig {
                    mode: SelectionMode::Range,
                    min: Some(0),
                    max: Some(0),
                    ..SelectionConfig::default()
                },
                valid:       false,
                description: "range with zero max",
            },
            TestCase {
                config:      SelectionConfig {
                    mode: SelectionMode::Range,
                    min: Some(0),
                    max: Some(1),
                    exclude_disabled: true,
                    ..SelectionConfig::default()
                },
                valid:       true,
                description: "range with zero min",
            },
            TestCase {
                config:      SelectionConfig {
                    mode: SelectionMode::Single,
                    exclude_disabled: true,
                    ..SelectionConfig::default()
                },
                valid:       false,
                description: "exclude_disabled outside range mode",
            },
        ];

        for case in &cases {
            let result = case.config.validate();
            assert_eq!(result.is_ok(), case.valid, "{}: {result:?}", case.description);
            if !case.valid {
                assert!(matches!(result, Err(CalendarError::Configuration(_))), "{}", case.description);
            }
        }
    }

    #[test]
    fn test_selection_mode_display() {
        assert_eq!(SelectionMode::Range.to_string(), "range");
        assert_eq!(SelectionMode::default(), SelectionMode::Single);
    }

    #[test]
    fn test_from_toml_str() {
        let config = CalendarConfig::from_toml_str(
            r#"
            start_month = "2024-01-01"
            end_month = "2024-12-01"
            show_outside_days = true
            disabled = [{ day_of_week = [0, 6] }, "2024-12-24/2024-12-26", { before = "2024-01-15" }]

            [grid]
            number_of_months = 2
            iso_week = true

            [selection]
            mode = "range"
            max = 14

            [modifiers]
            booked = ["2024-03-01", "2024-03-02"]
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.number_of_months.get(), 2);
        assert!(config.grid.iso_week);
        assert!(!config.grid.fixed_weeks);
        assert_eq!(config.selection.mode, SelectionMode::Range);
        assert_eq!(config.selection.max, Some(14));
        assert_eq!(config.start_month, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(config.show_outside_days);
        assert_eq!(config.disabled.len(), 3);
        assert_eq!(
            config.disabled[0],
            MatcherConfig::DayOfWeek {
                day_of_week: vec![DayOfWeek::SUNDAY, DayOfWeek::SATURDAY],
            }
        );
        assert_eq!(
            config.disabled[1],
            MatcherConfig::Date("2024-12-24/2024-12-26".to_owned())
        );
        assert_eq!(
            config.disabled[2],
            MatcherConfig::Bounds {
                before: NaiveDate::from_ymd_opt(2024, 1, 15),
                after:  None,
            }
        );
        assert_eq!(config.modifiers["booked"].len(), 2);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_documents() {
        assert!(matches!(
            CalendarConfig::from_toml_str("grid = 3"),
            Err(CalendarError::Toml(_))
        ));
        assert!(matches!(
            CalendarConfig::from_toml_str("[grid]\nnumber_of_months = 0"),
            Err(CalendarError::Toml(_))
        ));
        assert!(matches!(
            CalendarConfig::from_toml_str("start_month = \"2024-05-01\"\nend_month = \"2024-01-01\""),
            Err(CalendarError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = CalendarConfig::from_toml_str("").unwrap();
        assert_eq!(config, CalendarConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = CalendarConfig::load("/nonexistent/day_grid/calendar.toml");
        assert!(matches!(result, Err(CalendarError::Io(_))));
    }
}
