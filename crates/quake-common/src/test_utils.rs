//! Test utilities and shared fixtures for the quakewatch workspace.
//!
//! Enabled for other crates through the `testing` feature.

use crate::types::{RawEvent, RawEventBatch};
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests once per process. Safe to call repeatedly.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Epoch milliseconds of a UTC wall-clock time.
pub fn utc_millis(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
        .timestamp_millis()
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builder-style fixtures for feed data.
pub mod event_fixtures {
    use super::*;

    /// Event at noon UTC of the given day.
    pub fn event_on(day: NaiveDate, magnitude: Option<f64>, place: Option<&str>) -> RawEvent {
        let millis = day
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        RawEvent {
            magnitude,
            place: place.map(str::to_string),
            occurred_at_millis: millis,
            event_type: "earthquake".to_string(),
            title: match (magnitude, place) {
                (Some(m), Some(p)) => format!("M {m} - {p}"),
                (None, Some(p)) => format!("M ? - {p}"),
                (_, None) => "M ? - Unknown".to_string(),
            },
        }
    }

    /// Wraps events in a `FeatureCollection` batch.
    pub fn batch(events: Vec<RawEvent>) -> RawEventBatch {
        RawEventBatch::new("FeatureCollection", events)
    }

    /// Small mixed batch spanning 2023-11-20 .. 2023-11-25.
    pub fn sample_batch() -> RawEventBatch {
        batch(vec![
            event_on(date(2023, 11, 20), Some(1.2), Some("5km NE of Pahala, Hawaii")),
            event_on(
                date(2023, 11, 22),
                Some(3.0),
                Some("10km N of Ridgecrest, California"),
            ),
            event_on(date(2023, 11, 22), Some(5.2), Some("Tonga Islands, Tonga")),
            event_on(date(2023, 11, 25), None, Some("central Alaska")),
            event_on(date(2023, 11, 25), Some(2.4), None),
        ])
    }

    /// GeoJSON body as served by the USGS endpoint, with extra fields.
    pub fn sample_geojson() -> &'static str {
        r#"{
  "type": "FeatureCollection",
  "metadata": { "generated": 1700700000000, "count": 3, "status": 200 },
  "features": [
    {
      "type": "Feature",
      "properties": {
        "mag": 4.6,
        "place": "10km N of Ridgecrest, California",
        "time": 1700661600000,
        "updated": 1700662000000,
        "type": "earthquake",
        "title": "M 4.6 - 10km N of Ridgecrest, California"
      },
      "geometry": { "type": "Point", "coordinates": [-117.6, 35.7, 8.1] },
      "id": "ci40000001"
    },
    {
      "type": "Feature",
      "properties": {
        "mag": null,
        "place": null,
        "time": 1700683200000,
        "type": "quarry blast",
        "title": "Quarry blast"
      }
    },
    {
      "type": "Feature",
      "properties": {
        "mag": 2.1,
        "place": "central Alaska",
        "time": 1700700000000,
        "type": "earthquake",
        "title": "M 2.1 - central Alaska"
      }
    }
  ],
  "bbox": [-180, -90, -10, 180, 90, 700]
}"#
    }
}

#[cfg(test)]
mod tests {
    use super::event_fixtures::*;
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_event_on_uses_noon_utc() {
        let event = event_on(date(2023, 11, 22), Some(1.0), Some("x"));
        assert_eq!(event.occurred_at_millis, utc_millis(2023, 11, 22, 12, 0, 0));
    }

    #[test]
    fn test_sample_batch_shape() {
        let batch = sample_batch();
        assert_eq!(batch.batch_type, "FeatureCollection");
        assert_eq!(batch.len(), 5);
    }
}
