//! Wiring of the refresh loop and the console for the `watch` command.

use crate::commands::Command;
use crate::console::{Console, Flow};
use crate::error::WatchResult;
use crate::refresh::RefreshLoop;
use crate::state::FilterHandle;
use chrono::{NaiveDate, TimeZone};
use quake_common::{validate_range_start, FilterState, PlaceSet};
use quake_config::Config;
use quake_feed::{export_to_csv, EventSource, FeedPipeline};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the interactive watcher until `quit`, end of input, or `cancel`.
///
/// The place list is captured once before the loop starts. Commands are read
/// from `input`, views are written to `out`.
pub async fn run_watch<S, Tz, R, W>(
    config: &Config,
    pipeline: FeedPipeline<S, Tz>,
    input: R,
    out: W,
    cancel: CancellationToken,
) -> WatchResult<W>
where
    S: EventSource + 'static,
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: fmt::Display + Send + Sync,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let filter = Arc::new(FilterHandle::default());
    let mut console = Console::new(out, Arc::clone(&filter), config);
    console.greet()?;

    match pipeline.places().await {
        Ok(places) => {
            info!(places = places.len(), "Captured place list");
            console.set_places(places);
        }
        Err(e) => {
            warn!(error = %e, "Could not fetch place list");
            console.report_failure(e.to_string())?;
        }
    }

    let period = Duration::from_secs(config.refresh.interval_seconds);
    let (refresh, mut handle) = RefreshLoop::new(pipeline, Arc::clone(&filter), period);
    let loop_cancel = cancel.child_token();
    let task = tokio::spawn(refresh.run(loop_cancel.clone()));

    let mut lines = input.lines();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                match line.parse::<Command>() {
                    Ok(command) => {
                        if console.handle(command)? == Flow::Quit {
                            break;
                        }
                    }
                    Err(crate::commands::ParseCommandError::Empty) => {}
                    Err(e) => console.report_input_error(&e)?,
                }
            }
            changed = handle.snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = handle.snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    console.show_snapshot(snapshot)?;
                }
            }
            changed = handle.status.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = handle.status.borrow_and_update().clone();
                console.observe_status(status)?;
            }
        }
    }

    loop_cancel.cancel();
    task.await?;
    Ok(console.into_inner())
}

/// Filter for a one-shot export.
///
/// `since` follows the same rule as the console: it must be a `yyyy-MM-dd`
/// date strictly after `baseline`.
pub fn export_filter(
    place: Option<&str>,
    since: Option<&str>,
    baseline: NaiveDate,
) -> quake_common::Result<FilterState> {
    let since = since
        .map(|input| validate_range_start(input, baseline))
        .transpose()?;
    Ok(FilterState::unfiltered()
        .with_place(place)
        .with_date_range_start(since))
}

/// One-shot fetch, filter and CSV export. Returns the number of rows written.
pub async fn run_export<S, Tz>(
    pipeline: &FeedPipeline<S, Tz>,
    filter: &FilterState,
    path: &Path,
) -> WatchResult<usize>
where
    S: EventSource,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: fmt::Display + Send + Sync,
{
    let events = pipeline.run(filter).await?;
    let rows = export_to_csv(path, &events)?;
    info!(rows, path = %path.display(), "One-shot export finished");
    Ok(rows)
}

/// One-shot fetch of the distinct regions.
pub async fn run_places<S, Tz>(pipeline: &FeedPipeline<S, Tz>) -> WatchResult<PlaceSet>
where
    S: EventSource,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: fmt::Display + Send + Sync,
{
    Ok(pipeline.places().await?)
}
