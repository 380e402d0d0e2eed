//! Place and date-range predicates over raw events.

use chrono::{NaiveDate, TimeZone};
use quake_common::{local_date_in, FilterState, RawEvent, RawEventBatch};

/// Case-insensitive substring match on the place, absent place read as "Unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacePredicate {
    needle: String,
}

impl PlacePredicate {
    /// Predicate for `substring`; `None` when the substring is blank.
    pub fn new(substring: &str) -> Option<Self> {
        let needle = substring.trim().to_lowercase();
        (!needle.is_empty()).then_some(Self { needle })
    }

    /// Whether the event's place contains the substring.
    pub fn matches(&self, event: &RawEvent) -> bool {
        event.place_or_unknown().to_lowercase().contains(&self.needle)
    }
}

/// Inclusive `[start, end]` check on the event's calendar day in a time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangePredicate {
    /// First included day.
    pub start: NaiveDate,
    /// Last included day.
    pub end: NaiveDate,
}

impl DateRangePredicate {
    /// Window from `start` up to and including `today`.
    pub fn until_today(start: NaiveDate, today: NaiveDate) -> Self {
        Self { start, end: today }
    }

    /// Whether `day` lies inside the window.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Events whose time cannot be placed on a day never match.
    pub fn matches<Tz: TimeZone>(&self, event: &RawEvent, tz: &Tz) -> bool {
        local_date_in(event.occurred_at_millis, tz).is_some_and(|day| self.contains(day))
    }
}

/// Applies the active predicates of `state`: date range first, then place.
///
/// With no predicate active the batch is returned unchanged.
pub fn apply_filters<Tz: TimeZone>(
    batch: RawEventBatch,
    state: &FilterState,
    today: NaiveDate,
    tz: &Tz,
) -> RawEventBatch {
    let mut batch = batch;

    if let Some(start) = state.date_range_start {
        let range = DateRangePredicate::until_today(start, today);
        batch = batch.retain(|event| range.matches(event, tz));
    }

    if let Some(place) = state.active_place().and_then(PlacePredicate::new) {
        batch = batch.retain(|event| place.matches(event));
    }

    batch
}
