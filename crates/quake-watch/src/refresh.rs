//! Periodic re-fetch of the feed.
//!
//! The loop owns the pipeline and runs it inline, one tick at a time. A tick
//! never overlaps with another: ticks that fall due while a fetch is still in
//! flight are skipped, not queued. Results leave the loop through two `watch`
//! channels, so a consumer only ever sees the latest status and the latest
//! snapshot.

use crate::state::FilterHandle;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use quake_common::{DisplayEvent, FilterState};
use quake_feed::{max_magnitude_per_day, EventSource, FeedPipeline};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Where the loop currently is.
///
/// `Succeeded` and `Failed` are resting states: the loop is idle and waiting
/// for the next tick, with the outcome of the last one attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// No tick has run yet.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The last tick published snapshot `generation` holding `events` rows.
    Succeeded {
        /// Generation of the published snapshot.
        generation: u64,
        /// Rows in the published snapshot.
        events: usize,
    },
    /// The last tick failed; the previous snapshot is still current.
    Failed {
        /// Error text of the failed fetch.
        message: String,
    },
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "waiting for first refresh"),
            Self::Fetching => write!(f, "fetching"),
            Self::Succeeded { generation, events } => {
                write!(f, "refresh #{generation} ok, {events} events")
            }
            Self::Failed { message } => write!(f, "last refresh failed: {message}"),
        }
    }
}

/// Result of one successful tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Increases by one with every published snapshot, starting at 1.
    pub generation: u64,
    /// Filter the events were selected with.
    pub filter: FilterState,
    /// Display list, ids `1..=N`.
    pub events: Vec<DisplayEvent>,
    /// Largest magnitude per local day, chronological.
    pub daily_max: BTreeMap<NaiveDate, f64>,
    /// Wall-clock time the snapshot was published.
    pub refreshed_at: DateTime<Local>,
}

/// Receiving side of the loop's channels.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    /// Latest loop status.
    pub status: watch::Receiver<RefreshStatus>,
    /// Latest snapshot, `None` until the first success.
    pub snapshots: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl RefreshHandle {
    /// Latest published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Latest status.
    pub fn current_status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }
}

/// Timer-driven refresh of the display list.
pub struct RefreshLoop<S, Tz: TimeZone = Local> {
    pipeline: FeedPipeline<S, Tz>,
    filter: Arc<FilterHandle>,
    period: Duration,
    generation: u64,
    status_tx: watch::Sender<RefreshStatus>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
}

impl<S, Tz> RefreshLoop<S, Tz>
where
    S: EventSource,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: fmt::Display + Send + Sync,
{
    /// Creates the loop and the handle its results are read from.
    pub fn new(
        pipeline: FeedPipeline<S, Tz>,
        filter: Arc<FilterHandle>,
        period: Duration,
    ) -> (Self, RefreshHandle) {
        let (status_tx, status) = watch::channel(RefreshStatus::Idle);
        let (snapshot_tx, snapshots) = watch::channel(None);

        let refresh = Self {
            pipeline,
            filter,
            period,
            generation: 0,
            status_tx,
            snapshot_tx,
        };
        (refresh, RefreshHandle { status, snapshots })
    }

    /// Runs until `cancel` fires. The first tick runs immediately.
    ///
    /// Besides the timer, a wake-up on the filter handle starts a tick early
    /// and restarts the interval from there.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = self.period.as_secs(), "Refresh loop started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                () = self.filter.woken() => {
                    debug!("Early refresh requested");
                    ticker.reset();
                }
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                _ = self.tick() => {}
            }
        }

        info!(generation = self.generation, "Refresh loop stopped");
    }

    /// Runs one fetch-filter-aggregate pass and publishes its outcome.
    ///
    /// On failure the previous snapshot stays current. Returns whether a new
    /// snapshot was published.
    #[instrument(skip(self), fields(generation = self.generation + 1))]
    pub async fn tick(&mut self) -> bool {
        let filter = self.filter.current();
        self.status_tx.send_replace(RefreshStatus::Fetching);

        match self.pipeline.run(&filter).await {
            Ok(events) => {
                self.generation += 1;
                let count = events.len();
                let snapshot = Snapshot {
                    generation: self.generation,
                    filter: FilterState::clone(&filter),
                    daily_max: max_magnitude_per_day(&events),
                    events,
                    refreshed_at: Local::now(),
                };

                self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
                self.status_tx.send_replace(RefreshStatus::Succeeded {
                    generation: self.generation,
                    events: count,
                });
                debug!(events = count, "Published snapshot");
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    transient = e.is_transient(),
                    "Refresh failed, keeping previous snapshot"
                );
                self.status_tx.send_replace(RefreshStatus::Failed {
                    message: e.to_string(),
                });
                false
            }
        }
    }
}
