//! Per-day maximum magnitude, the data behind the bar chart.

use chrono::NaiveDate;
use quake_common::{DisplayEvent, DATE_FORMAT};
use std::collections::BTreeMap;

/// One chart bar.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBar {
    /// Local calendar day.
    pub day: NaiveDate,
    /// Abbreviated month and day of month, e.g. "Nov 22".
    pub label: String,
    /// Largest magnitude seen that day.
    pub max_magnitude: f64,
}

/// Calendar day of a formatted time, read from its `yyyy-MM-dd` prefix.
pub fn day_of(formatted_time: &str) -> Option<NaiveDate> {
    let prefix = formatted_time.get(..10)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

/// Groups events by day and keeps the largest magnitude seen for each day.
///
/// Events whose time does not start with a date are skipped.
pub fn max_magnitude_per_day(events: &[DisplayEvent]) -> BTreeMap<NaiveDate, f64> {
    let mut per_day = BTreeMap::new();

    for event in events {
        let Some(day) = day_of(&event.formatted_time) else {
            continue;
        };
        per_day
            .entry(day)
            .and_modify(|max: &mut f64| {
                if event.magnitude > *max {
                    *max = event.magnitude;
                }
            })
            .or_insert(event.magnitude);
    }

    per_day
}

/// Chart bars in chronological order.
pub fn chart_bars(per_day: &BTreeMap<NaiveDate, f64>) -> Vec<DayBar> {
    per_day
        .iter()
        .map(|(day, max_magnitude)| DayBar {
            day: *day,
            label: day.format("%b %d").to_string(),
            max_magnitude: *max_magnitude,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_common::test_utils::date;

    fn display(time: &str, magnitude: f64) -> DisplayEvent {
        DisplayEvent {
            sequence_id: 1,
            magnitude,
            place: "x".to_string(),
            formatted_time: time.to_string(),
            event_type: "earthquake".to_string(),
            title: "t".to_string(),
        }
    }

    #[test]
    fn test_max_per_day() {
        let events = vec![
            display("2023-11-22 01:00:00", 3.0),
            display("2023-11-22 18:30:00", 5.2),
            display("2023-11-23 09:00:00", 1.0),
        ];
        let per_day = max_magnitude_per_day(&events);

        assert_eq!(per_day.len(), 2);
        assert_eq!(per_day[&date(2023, 11, 22)], 5.2);
        assert_eq!(per_day[&date(2023, 11, 23)], 1.0);
    }

    #[test]
    fn test_first_max_kept_when_later_is_smaller() {
        let events = vec![
            display("2023-11-22 01:00:00", 4.0),
            display("2023-11-22 02:00:00", 0.0),
        ];
        assert_eq!(max_magnitude_per_day(&events)[&date(2023, 11, 22)], 4.0);
    }

    #[test]
    fn test_unknown_time_skipped() {
        let events = vec![display("Unknown", 9.0), display("2023-11-22 00:00:00", 1.0)];
        let per_day = max_magnitude_per_day(&events);
        assert_eq!(per_day.len(), 1);
        assert_eq!(per_day[&date(2023, 11, 22)], 1.0);
    }

    #[test]
    fn test_chart_bars_labels_and_order() {
        let events = vec![
            display("2023-12-01 00:00:00", 2.0),
            display("2023-11-22 00:00:00", 1.5),
        ];
        let bars = chart_bars(&max_magnitude_per_day(&events));
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Nov 22", "Dec 01"]);
        assert_eq!(bars[1].max_magnitude, 2.0);
    }

    #[test]
    fn test_day_of_rejects_short_input() {
        assert_eq!(day_of("2023-11"), None);
        assert_eq!(day_of("2023-11-22"), Some(date(2023, 11, 22)));
    }
}
