//! Plain-text table and bar chart for a snapshot.

use chrono::NaiveDate;
use quake_common::{format_magnitude, truncate_string, DisplayEvent};
use quake_config::DisplayConfig;
use quake_feed::chart_bars;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Chart title.
pub const CHART_TITLE: &str = "Max Magnitude per Day";

const INDEX_WIDTH: usize = 5;
const MAGNITUDE_WIDTH: usize = 9;
const TIME_WIDTH: usize = 19;
const TYPE_WIDTH: usize = 12;
const BAR_CHAR: char = '#';

/// Renders the event table, at most `display.max_rows` rows.
pub fn render_table(events: &[DisplayEvent], display: &DisplayConfig) -> String {
    let text_width = display.column_width;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:>iw$} | {:>mw$} | {:<tw$} | {:<timew$} | {:<typew$} | Title",
        "Index",
        "Magnitude",
        "Place",
        "Time",
        "Type",
        iw = INDEX_WIDTH,
        mw = MAGNITUDE_WIDTH,
        tw = text_width,
        timew = TIME_WIDTH,
        typew = TYPE_WIDTH,
    );
    let rule_width = INDEX_WIDTH + MAGNITUDE_WIDTH + TIME_WIDTH + TYPE_WIDTH + 2 * text_width + 15;
    let _ = writeln!(out, "{}", "-".repeat(rule_width));

    for event in events.iter().take(display.max_rows) {
        let _ = writeln!(
            out,
            "{:>iw$} | {:>mw$} | {:<tw$} | {:<timew$} | {:<typew$} | {}",
            event.sequence_id,
            format_magnitude(event.magnitude),
            truncate_string(&event.place, text_width),
            event.formatted_time,
            truncate_string(&event.event_type, TYPE_WIDTH),
            truncate_string(&event.title, text_width),
            iw = INDEX_WIDTH,
            mw = MAGNITUDE_WIDTH,
            tw = text_width,
            timew = TIME_WIDTH,
            typew = TYPE_WIDTH,
        );
    }

    if events.is_empty() {
        let _ = writeln!(out, "(no events)");
    } else if events.len() > display.max_rows {
        let _ = writeln!(
            out,
            "... {} more, {} events in total",
            events.len() - display.max_rows,
            events.len()
        );
    }

    out
}

/// Number of bar characters for `magnitude` when `peak` fills `width`.
pub fn bar_length(magnitude: f64, peak: f64, width: usize) -> usize {
    if peak <= 0.0 || magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let ratio = (magnitude / peak).min(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let length = (ratio * width as f64).round() as usize;
    length
}

/// Renders one bar per day, scaled so the largest maximum spans `display.chart_width`.
pub fn render_chart(daily_max: &BTreeMap<NaiveDate, f64>, display: &DisplayConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{CHART_TITLE}");

    let bars = chart_bars(daily_max);
    if bars.is_empty() {
        let _ = writeln!(out, "(no data)");
        return out;
    }

    let peak = bars
        .iter()
        .map(|bar| bar.max_magnitude)
        .fold(f64::NEG_INFINITY, f64::max);

    for bar in &bars {
        let length = bar_length(bar.max_magnitude, peak, display.chart_width);
        let _ = writeln!(
            out,
            "{} | {:<width$} {}",
            bar.label,
            BAR_CHAR.to_string().repeat(length),
            format_magnitude(bar.max_magnitude),
            width = display.chart_width,
        );
    }

    out
}
