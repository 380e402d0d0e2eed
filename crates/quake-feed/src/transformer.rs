//! Derives the place selector and the display list from a raw batch.

use chrono::{Local, TimeZone};
use quake_common::{
    format_timestamp_in, DisplayEvent, PlaceSet, RawEvent, RawEventBatch, UNKNOWN_PLACE,
};

/// Region part of a place: the text after the first comma, trimmed.
///
/// `"10km N of Ridgecrest, California"` gives `"California"`. A place
/// without a comma, with nothing after it, or no place at all gives
/// `"Unknown"`.
pub fn region_of(place: Option<&str>) -> &str {
    place
        .and_then(|p| p.split_once(','))
        .map(|(_, region)| region.trim())
        .filter(|region| !region.is_empty())
        .unwrap_or(UNKNOWN_PLACE)
}

/// Distinct regions of a batch, sorted.
pub fn distinct_places(batch: &RawEventBatch) -> PlaceSet {
    batch
        .events
        .iter()
        .map(|event| region_of(event.place.as_deref()).to_string())
        .collect()
}

/// Display list in the system time zone.
pub fn to_display_list(batch: &RawEventBatch) -> Vec<DisplayEvent> {
    to_display_list_in(batch, &Local)
}

/// Display list with times formatted in `tz`. Ids are 1-based positions.
pub fn to_display_list_in<Tz>(batch: &RawEventBatch, tz: &Tz) -> Vec<DisplayEvent>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    batch
        .events
        .iter()
        .zip(1u32..)
        .map(|(event, sequence_id)| to_display_event(event, sequence_id, tz))
        .collect()
}

fn to_display_event<Tz>(event: &RawEvent, sequence_id: u32, tz: &Tz) -> DisplayEvent
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DisplayEvent {
        sequence_id,
        magnitude: event.magnitude.unwrap_or(0.0),
        place: event.place_or_unknown().to_string(),
        formatted_time: format_timestamp_in(event.occurred_at_millis, tz),
        event_type: event.event_type.clone(),
        title: event.title.clone(),
    }
}
