//! Time-zone aware dates.
//!
//! `ZonedCalendar` works for every chrono `TimeZone`: `Utc`, `FixedOffset`
//! or an IANA zone from `chrono-tz`. Resolving a wall-clock reading back to
//! an instant is the hot path of grid building, so the offsets found are
//! memoised in an `OffsetCache` owned by the calendar value.

use crate::CalendarError;
use crate::capability::DateCapability;
use crate::consts::DEFAULT_OFFSET_CACHE_CAPACITY;
use crate::naive::parse_naive;
use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Hours tried past a wall-clock reading that falls in a transition gap.
const MAX_GAP_HOURS: i64 = 24;

/// Bounded memo of wall-clock reading to UTC offset for one time zone.
///
/// The cache is emptied once it reaches its capacity, so its memory use
/// stays bounded over a long-lived calendar.
pub struct OffsetCache<O> {
    capacity: usize,
    entries:  Mutex<HashMap<NaiveDateTime, O>>,
}

impl<O: Clone> OffsetCache<O> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries:  Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, civil: &NaiveDateTime) -> Option<O> {
        self.entries.lock().get(civil).cloned()
    }

    pub fn insert(&self, civil: NaiveDateTime, offset: O) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            trace!(capacity = self.capacity, "offset cache full, clearing");
            entries.clear();
        }
        entries.insert(civil, offset);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<O> fmt::Debug for OffsetCache<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffsetCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.lock().len())
            .finish()
    }
}

/// Dates anchored in a time zone.
pub struct ZonedCalendar<Tz: TimeZone> {
    tz:     Tz,
    cache:  OffsetCache<Tz::Offset>,
    frozen: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> ZonedCalendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self::with_cache(tz, OffsetCache::with_capacity(DEFAULT_OFFSET_CACHE_CAPACITY))
    }

    /// Uses the supplied cache instead of a fresh default-sized one.
    pub const fn with_cache(tz: Tz, cache: OffsetCache<Tz::Offset>) -> Self {
        Self {
            tz,
            cache,
            frozen: None,
        }
    }

    /// Freezes the clock at `now`.
    #[must_use]
    pub fn frozen_at(mut self, now: DateTime<Tz>) -> Self {
        self.frozen = Some(now);
        self
    }

    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    pub const fn cache(&self) -> &OffsetCache<Tz::Offset> {
        &self.cache
    }

    fn resolve(&self, civil: NaiveDateTime) -> DateTime<Tz> {
        match self.tz.from_local_datetime(&civil) {
            LocalResult::Single(date) => date,
            LocalResult::Ambiguous(earliest, latest) => {
                trace!(%civil, ?earliest, ?latest, "ambiguous wall-clock reading, using earliest");
                earliest
            },
            LocalResult::None => self.resolve_gap(civil),
        }
    }

    fn resolve_gap(&self, civil: NaiveDateTime) -> DateTime<Tz> {
        for hours in 1..=MAX_GAP_HOURS {
            let Some(shifted) = civil.checked_add_signed(TimeDelta::hours(hours)) else {
                break;
            };
            if let Some(date) = self.tz.from_local_datetime(&shifted).earliest() {
                debug!(%civil, %shifted, "wall-clock reading falls in a transition gap, moved forward");
                return date;
            }
        }
        debug!(%civil, "no wall-clock reading after gap, reading as UTC");
        self.tz.from_utc_datetime(&civil)
    }
}

impl<Tz: TimeZone + fmt::Debug> fmt::Debug for ZonedCalendar<Tz> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZonedCalendar")
            .field("tz", &self.tz)
            .field("cache", &self.cache)
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl<Tz> DateCapability for ZonedCalendar<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    type Date = DateTime<Tz>;

    fn now(&self) -> DateTime<Tz> {
        self.frozen
            .clone()
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz))
    }

    fn to_civil(&self, date: &DateTime<Tz>) -> NaiveDateTime {
        date.naive_local()
    }

    fn from_civil(&self, civil: NaiveDateTime) -> DateTime<Tz> {
        if let Some(offset) = self.cache.get(&civil) {
            let utc_offset = TimeDelta::seconds(i64::from(offset.fix().local_minus_utc()));
            if let Some(utc) = civil.checked_sub_signed(utc_offset) {
                return DateTime::from_naive_utc_and_offset(utc, offset);
            }
        }
        let date = self.resolve(civil);
        // readings moved out of a gap map to a different wall clock; not memoised
        if date.naive_local() == civil {
            self.cache.insert(civil, date.offset().clone());
        }
        date
    }

    fn to_iso_string(&self, date: &DateTime<Tz>) -> String {
        date.to_rfc3339()
    }

    fn parse_iso(&self, input: &str) -> Result<DateTime<Tz>, CalendarError> {
        match DateTime::parse_from_rfc3339(input.trim()) {
            Ok(date) => Ok(date.with_timezone(&self.tz)),
            Err(_) => parse_naive(input).map(|civil| self.from_civil(civil)),
        }
    }
}
