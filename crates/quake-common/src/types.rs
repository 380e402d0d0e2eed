//! Event model shared by the fetcher, the pipeline and the front-end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Place label used whenever an event carries no usable place.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// One earthquake event as reported by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Magnitude, absent for some event types.
    pub magnitude: Option<f64>,
    /// Free-form place description, e.g. "10km N of Ridgecrest, California".
    pub place: Option<String>,
    /// Origin time in epoch milliseconds (UTC).
    pub occurred_at_millis: i64,
    /// Event type, e.g. "earthquake" or "quarry blast".
    pub event_type: String,
    /// Human readable title.
    pub title: String,
}

impl RawEvent {
    /// Place used for matching, with the unknown fallback applied.
    pub fn place_or_unknown(&self) -> &str {
        self.place.as_deref().unwrap_or(UNKNOWN_PLACE)
    }
}

/// One snapshot of events returned by a single feed request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEventBatch {
    /// Top-level tag of the response envelope.
    pub batch_type: String,
    /// Events in feed order.
    pub events: Vec<RawEvent>,
}

impl RawEventBatch {
    /// Creates a batch with the given tag and events.
    pub fn new(batch_type: impl Into<String>, events: Vec<RawEvent>) -> Self {
        Self {
            batch_type: batch_type.into(),
            events,
        }
    }

    /// Returns a batch with the same tag holding only the events kept by `keep`.
    pub fn retain<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&RawEvent) -> bool,
    {
        Self {
            batch_type: self.batch_type,
            events: self.events.into_iter().filter(|event| keep(event)).collect(),
        }
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Display-ready projection of a [`RawEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// 1-based position in the displayed sequence.
    pub sequence_id: u32,
    /// Magnitude, `0.0` when the feed reported none.
    pub magnitude: f64,
    /// Place, `"Unknown"` when the feed reported none.
    pub place: String,
    /// `yyyy-MM-dd HH:mm:ss` in the display time zone.
    pub formatted_time: String,
    /// Event type as reported.
    pub event_type: String,
    /// Title as reported.
    pub title: String,
}

/// Distinct region names derived from the place field of a batch.
pub type PlaceSet = BTreeSet<String>;

/// Active filters. Replaced as a whole, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring the place must contain.
    pub place_substring: Option<String>,
    /// First day of the inclusive `[start, today]` window.
    pub date_range_start: Option<NaiveDate>,
}

impl FilterState {
    /// State with no filter configured.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Returns a copy with the place filter replaced. Blank input clears it.
    pub fn with_place(&self, place: Option<&str>) -> Self {
        let place_substring = place
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            place_substring,
            date_range_start: self.date_range_start,
        }
    }

    /// Returns a copy with the date-range start replaced.
    pub fn with_date_range_start(&self, start: Option<NaiveDate>) -> Self {
        Self {
            place_substring: self.place_substring.clone(),
            date_range_start: start,
        }
    }

    /// Place filter, ignoring blank values.
    pub fn active_place(&self) -> Option<&str> {
        self.place_substring
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    /// Whether neither predicate is configured.
    pub fn is_unfiltered(&self) -> bool {
        self.active_place().is_none() && self.date_range_start.is_none()
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.active_place(), self.date_range_start) {
            (None, None) => write!(f, "no filter"),
            (Some(place), None) => write!(f, "place ~ \"{place}\""),
            (None, Some(start)) => write!(f, "since {start}"),
            (Some(place), Some(start)) => write!(f, "place ~ \"{place}\", since {start}"),
        }
    }
}
