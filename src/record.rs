//! Persisted form of a selection.
//!
//! Dates are stored as ISO-8601 strings:
//!
//! - single: `"2024-05-01T00:00:00"`
//! - multiple: `["2024-05-01T00:00:00", "2024-05-03T00:00:00"]`
//! - range: `{"from": "2024-05-01T00:00:00", "to": "2024-05-04T00:00:00"}`,
//!   without `to` while the range is open.

use crate::CalendarError;
use crate::capability::DateCapability;
use crate::range::DateRange;
use crate::selection::{RangeSelection, Selection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionRecord {
    Single(String),
    Multiple(Vec<String>),
    Range {
        from: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to:   Option<String>,
    },
}

impl SelectionRecord {
    /// Record of `selection`, or `None` when a single or range selection is
    /// empty.
    pub fn encode<C>(lib: &C, selection: &Selection<C::Date>) -> Option<Self>
    where
        C: DateCapability,
    {
        match selection {
            Selection::Single(selected) => selected
                .as_ref()
                .map(|date| Self::Single(lib.to_iso_string(date))),
            Selection::Multiple(selected) => Some(Self::Multiple(
                selected.iter().map(|date| lib.to_iso_string(date)).collect(),
            )),
            Selection::Range(RangeSelection::Empty) => None,
            Selection::Range(RangeSelection::Open { from }) => Some(Self::Range {
                from: lib.to_iso_string(from),
                to:   None,
            }),
            Selection::Range(RangeSelection::Closed(range)) => Some(Self::Range {
                from: lib.to_iso_string(range.from()),
                to:   Some(lib.to_iso_string(range.to())),
            }),
        }
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` for an unparseable date and
    /// `CalendarError::InvalidRange` for a range whose end precedes its start.
    pub fn decode<C>(&self, lib: &C) -> Result<Selection<C::Date>, CalendarError>
    where
        C: DateCapability,
    {
        let selection = match self {
            Self::Single(raw) => Selection::Single(Some(lib.parse_iso(raw)?)),
            Self::Multiple(raw) => Selection::Multiple(
                raw.iter()
                    .map(|date| lib.parse_iso(date))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Range { from, to: None } => Selection::Range(RangeSelection::Open {
                from: lib.parse_iso(from)?,
            }),
            Self::Range { from, to: Some(to) } => {
                let from = lib.parse_iso(from)?;
                let to = lib.parse_iso(to)?;
                if to < from {
                    return Err(CalendarError::InvalidRange(format!(
                        "range ends before it starts: {} > {}",
                        lib.to_iso_string(&from),
                        lib.to_iso_string(&to)
                    )));
                }
                Selection::Range(RangeSelection::Closed(DateRange::ordered(from, to)))
            },
        };
        Ok(selection)
    }
}
