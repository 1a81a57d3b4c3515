use crate::CalendarError;
use crate::capability::DateCapability;
use crate::consts::{ISO_DATE_FORMAT, ISO_NAIVE_FORMAT};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Wall-clock dates without any offset: what the user sees is what is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaiveCalendar {
    frozen: Option<NaiveDateTime>,
}

impl NaiveCalendar {
    /// A calendar reading the local system clock.
    pub const fn new() -> Self {
        Self { frozen: None }
    }

    /// A calendar whose clock always reads `now`.
    pub const fn frozen_at(now: NaiveDateTime) -> Self {
        Self { frozen: Some(now) }
    }
}

impl DateCapability for NaiveCalendar {
    type Date = NaiveDateTime;

    fn now(&self) -> NaiveDateTime {
        self.frozen.unwrap_or_else(|| Local::now().naive_local())
    }

    fn to_civil(&self, date: &NaiveDateTime) -> NaiveDateTime {
        *date
    }

    fn from_civil(&self, civil: NaiveDateTime) -> NaiveDateTime {
        civil
    }

    fn to_iso_string(&self, date: &NaiveDateTime) -> String {
        date.format(ISO_NAIVE_FORMAT).to_string()
    }

    fn parse_iso(&self, input: &str) -> Result<NaiveDateTime, CalendarError> {
        parse_naive(input)
    }
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff]`, a bare `YYYY-MM-DD` (midnight) or an
/// RFC 3339 timestamp, whose offset is dropped in favour of its wall clock.
pub(crate) fn parse_naive(input: &str) -> Result<NaiveDateTime, CalendarError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::InvalidDate(input.to_owned()));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| {
            NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|date| date.naive_local()))
        .map_err(|_| CalendarError::InvalidDate(input.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, ymd};

    #[test]
    fn test_frozen_clock() {
        let lib = NaiveCalendar::frozen_at(at(2024, 6, 2, 13, 45));
        assert_eq!(lib.now(), at(2024, 6, 2, 13, 45));
        assert_eq!(lib.today(), ymd(2024, 6, 2));
    }

    #[test]
    fn test_iso_string() {
        let lib = NaiveCalendar::new();
        assert_eq!(lib.to_iso_string(&at(2024, 6, 2, 13, 45)), "2024-06-02T13:45:00");
    }

    #[test]
    fn test_parse_iso_forms() {
        let lib = NaiveCalendar::new();
        assert_eq!(lib.parse_iso("2024-06-02T13:45:00").unwrap(), at(2024, 6, 2, 13, 45));
        assert_eq!(lib.parse_iso("2024-06-02T13:45:00.250").unwrap().date(), ymd(2024, 6, 2).date());
        assert_eq!(lib.parse_iso(" 2024-06-02 ").unwrap(), ymd(2024, 6, 2));
        assert_eq!(lib.parse_iso("2024-06-02T00:00:00+00:00").unwrap(), ymd(2024, 6, 2));
        assert_eq!(lib.parse_iso("2024-06-02T13:45:00-04:00").unwrap(), at(2024, 6, 2, 13, 45));
    }

    #[test]
    fn test_parse_iso_rejects_garbage() {
        let lib = NaiveCalendar::new();
        for input in ["", "   ", "2024-13-01", "2024-02-30", "not a date", "06/02/2024"] {
            let result = lib.parse_iso(input);
            assert!(
                matches!(result, Err(CalendarError::InvalidDate(_))),
                "expected {input:?} to be rejected"
            );
        }
    }
}
