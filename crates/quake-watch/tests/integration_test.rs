//! Integration tests for quake-watch crate.
//!
//! The refresh loop and the console run against scripted event sources, so
//! no network is involved.

use async_trait::async_trait;
use chrono::Utc;
use quake_common::test_utils::event_fixtures::sample_batch;
use quake_common::test_utils::{date, init_test_logging};
use quake_common::{FilterState, QuakeError, RawEventBatch, Result};
use quake_config::Config;
use quake_feed::{EventSource, FeedPipeline};
use quake_watch::{
    run_export, run_places, run_watch, FilterHandle, RefreshLoop, RefreshStatus, Snapshot,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Replays queued outcomes, then repeats the sample batch.
#[derive(Default)]
struct ScriptedSource {
    script: Mutex<VecDeque<Result<RawEventBatch>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn with(outcomes: Vec<Result<RawEventBatch>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch(&self) -> Result<RawEventBatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(sample_batch()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn pipeline(source: ScriptedSource) -> FeedPipeline<ScriptedSource, Utc> {
    FeedPipeline::with_timezone(source, Utc).with_fixed_today(date(2023, 11, 25))
}

fn refresh_loop(
    source: ScriptedSource,
    filter: Arc<FilterHandle>,
    period: Duration,
) -> (RefreshLoop<ScriptedSource, Utc>, quake_watch::RefreshHandle) {
    RefreshLoop::new(pipeline(source), filter, period)
}

#[tokio::test]
async fn test_tick_publishes_snapshot() {
    init_test_logging();
    let filter = Arc::new(FilterHandle::default());
    let (mut refresh, handle) =
        refresh_loop(ScriptedSource::default(), filter, Duration::from_secs(10));

    assert_eq!(handle.current_status(), RefreshStatus::Idle);
    assert!(refresh.tick().await);

    let snapshot = handle.latest().unwrap();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.events.len(), 5);
    assert!(snapshot.filter.is_unfiltered());
    assert_eq!(snapshot.daily_max[&date(2023, 11, 22)], 5.2);
    assert_eq!(
        handle.current_status(),
        RefreshStatus::Succeeded {
            generation: 1,
            events: 5
        }
    );
}

#[tokio::test]
async fn test_failed_tick_keeps_previous_snapshot() {
    let source = ScriptedSource::with(vec![
        Ok(sample_batch()),
        Err(QuakeError::network("Connection error")),
    ]);
    let filter = Arc::new(FilterHandle::default());
    let (mut refresh, handle) = refresh_loop(source, filter, Duration::from_secs(10));

    assert!(refresh.tick().await);
    let before: Arc<Snapshot> = handle.latest().unwrap();

    assert!(!refresh.tick().await);
    let after = handle.latest().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(matches!(
        handle.current_status(),
        RefreshStatus::Failed { ref message } if message.contains("Connection error")
    ));

    // The loop recovers on the next tick
    assert!(refresh.tick().await);
    assert_eq!(handle.latest().unwrap().generation, 2);
}

#[tokio::test]
async fn test_tick_uses_current_filter() {
    let filter = Arc::new(FilterHandle::default());
    let (mut refresh, handle) =
        refresh_loop(ScriptedSource::default(), Arc::clone(&filter), Duration::from_secs(10));

    filter.set(
        FilterState::unfiltered()
            .with_place(Some("tonga"))
            .with_date_range_start(Some(date(2023, 11, 21))),
    );
    refresh.tick().await;

    let snapshot = handle.latest().unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].sequence_id, 1);
    assert_eq!(snapshot.events[0].place, "Tonga Islands, Tonga");
    assert_eq!(snapshot.filter.active_place(), Some("tonga"));
}

#[tokio::test]
async fn test_filter_change_wakes_running_loop() {
    let filter = Arc::new(FilterHandle::default());
    // Long period: only the first tick and the wake-up can produce snapshots
    let (refresh, mut handle) =
        refresh_loop(ScriptedSource::default(), Arc::clone(&filter), Duration::from_secs(3600));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(refresh.run(cancel.clone()));

    timeout(Duration::from_secs(5), handle.snapshots.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(handle.latest().unwrap().events.len(), 5);

    filter.set(FilterState::unfiltered().with_place(Some("california")));
    let snapshot = timeout(Duration::from_secs(5), async {
        loop {
            handle.snapshots.changed().await.unwrap();
            let latest = handle.snapshots.borrow_and_update().clone().unwrap();
            if latest.filter.active_place().is_some() {
                return latest;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(snapshot.events.len(), 1);

    cancel.cancel();
    timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

/// Takes `delay` per fetch and records how many fetches overlap.
struct SlowSource {
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait]
impl EventSource for SlowSource {
    async fn fetch(&self) -> Result<RawEventBatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(sample_batch())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetches_never_overlap() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_secs(35),
        calls: AtomicUsize::new(0),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });
    let pipeline = FeedPipeline::with_timezone(Arc::clone(&source), Utc)
        .with_fixed_today(date(2023, 11, 25));
    let (refresh, _handle) = RefreshLoop::new(
        pipeline,
        Arc::new(FilterHandle::default()),
        Duration::from_secs(10),
    );
    let cancel = CancellationToken::new();
    let task = tokio::spawn(refresh.run(cancel.clone()));

    tokio::time::sleep(Duration::from_secs(200)).await;
    cancel.cancel();
    task.await.unwrap();

    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    // Ticks due during a fetch are skipped, not replayed: one fetch per 40 s
    let calls = source.calls.load(Ordering::SeqCst);
    assert!((5..=6).contains(&calls), "calls = {calls}");
}

#[tokio::test]
async fn test_loop_stops_on_cancel() {
    let filter = Arc::new(FilterHandle::default());
    let (refresh, _handle) =
        refresh_loop(ScriptedSource::default(), filter, Duration::from_secs(3600));
    let cancel = CancellationToken::new();
    cancel.cancel();

    timeout(Duration::from_secs(5), refresh.run(cancel))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_watch_session_quits_on_command() {
    let config = Config::default();
    let input: &[u8] = b"place Alaska\nbogus\nstatus\nquit\n";
    let cancel = CancellationToken::new();

    let out = timeout(
        Duration::from_secs(5),
        run_watch(&config, pipeline(ScriptedSource::default()), input, Vec::new(), cancel),
    )
    .await
    .unwrap()
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Status: Choose any option"));
    assert!(text.contains("Status: Filtered by Alaska."));
    assert!(text.contains("unknown command 'bogus'"));
    assert!(text.contains("Filter: place ~ \"Alaska\""));
}

#[tokio::test]
async fn test_watch_reports_failed_place_fetch() {
    let source = ScriptedSource::with(vec![Err(QuakeError::network("Request timeout"))]);
    let input: &[u8] = b"quit\n";

    let out = run_watch(
        &Config::default(),
        pipeline(source),
        input,
        Vec::new(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Attention: Network error: Request timeout."));
}

#[tokio::test]
async fn test_one_shot_export_and_places() {
    let pipeline = pipeline(ScriptedSource::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("since.csv");

    let filter = FilterState::unfiltered().with_date_range_start(Some(date(2023, 11, 23)));
    let rows = run_export(&pipeline, &filter, &path).await.unwrap();
    assert_eq!(rows, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);

    let places = run_places(&pipeline).await.unwrap();
    assert!(places.contains("California"));
    assert!(places.contains("Unknown"));
    assert_eq!(pipeline.source().calls.load(Ordering::SeqCst), 2);
}
