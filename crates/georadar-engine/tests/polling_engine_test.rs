//! Integration tests for the signal polling engine
//!
//! The engine's wall clock is a `ManualClock` and tokio time is paused, so each
//! test advances both to drive the polling timer deterministically.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use georadar_core::config::EngineConfig;
use georadar_core::error::Result;
use georadar_core::models::{
    Coordinate, LocationFix, NotificationId, Signal, SignalId, SignalNotification,
};
use georadar_core::ports::{NotificationSink, SignalCatalog};
use georadar_core::{Clock, GeoradarError, ManualClock};
use georadar_engine::{
    LocationTracker, NotifyReason, OutcomeStatus, PollingState, SignalPollingEngine,
    SuppressReason,
};
use georadar_store::fixtures::demo_signals;
use georadar_store::{MemoryNotificationSink, SimulatedLocationProvider, StaticSignalCatalog};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const HERE: Coordinate = Coordinate::new(24.81511, 46.7086);

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
}

struct Harness {
    clock: ManualClock,
    tracker: LocationTracker,
    sink: Arc<MemoryNotificationSink>,
    engine: SignalPollingEngine,
}

impl Harness {
    fn new(signals: Vec<Signal>) -> Self {
        Self::with_catalog(Arc::new(StaticSignalCatalog::new(signals)), EngineConfig::default())
    }

    fn with_config(signals: Vec<Signal>, config: EngineConfig) -> Self {
        Self::with_catalog(Arc::new(StaticSignalCatalog::new(signals)), config)
    }

    fn with_catalog(catalog: Arc<dyn SignalCatalog>, config: EngineConfig) -> Self {
        let sink = Arc::new(MemoryNotificationSink::new());
        let (clock, tracker, engine) = build_engine(catalog, sink.clone(), config);

        Self { clock, tracker, sink, engine }
    }

    fn place_user(&self, at: Coordinate) {
        self.tracker.update_location(LocationFix::new(at, self.clock.now()));
    }

    /// Advance wall clock and tokio time together, letting due ticks run
    async fn advance(&self, by: Duration) {
        self.clock.advance(ChronoDuration::from_std(by).unwrap());
        tokio::time::sleep(by + Duration::from_millis(10)).await;
    }

    fn count_for(&self, id: &str) -> usize {
        self.sink.count_for(&SignalId::new(id))
    }
}

fn build_engine(
    catalog: Arc<dyn SignalCatalog>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
) -> (ManualClock, LocationTracker, SignalPollingEngine) {
    let clock = ManualClock::new(t0());
    let provider = Arc::new(SimulatedLocationProvider::new());
    let tracker = LocationTracker::new(provider, Arc::new(clock.clone()));
    let engine =
        SignalPollingEngine::new(config, tracker.clone(), catalog, sink, Arc::new(clock.clone()))
            .unwrap();

    (clock, tracker, engine)
}

fn event_in(minutes: i64) -> Signal {
    Signal::event("e1", "Expo", HERE, t0() + ChronoDuration::minutes(minutes), "Ending soon")
}

const TICK: Duration = Duration::from_secs(15);

/// Catalog that counts reads and can be switched into a failing state
struct ScriptedCatalog {
    failing: AtomicBool,
    calls: AtomicUsize,
    signals: Vec<Signal>,
}

impl ScriptedCatalog {
    fn new(signals: Vec<Signal>) -> Arc<Self> {
        Arc::new(Self { failing: AtomicBool::new(false), calls: AtomicUsize::new(0), signals })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalCatalog for ScriptedCatalog {
    async fn list_signals(&self) -> Result<Vec<Signal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GeoradarError::CatalogFetch { reason: "503 Service Unavailable".into() });
        }
        Ok(self.signals.clone())
    }
}

/// Sink whose deliveries take a configurable amount of tokio time
struct SlowSink {
    delay_ms: AtomicU64,
    inner: MemoryNotificationSink,
}

impl SlowSink {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay_ms: AtomicU64::new(delay.as_millis() as u64),
            inner: MemoryNotificationSink::new(),
        })
    }

    fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for SlowSink {
    async fn notify(&self, notification: &SignalNotification) -> Result<NotificationId> {
        let delay = Duration::from_millis(self.delay_ms.load(Ordering::SeqCst));
        tokio::time::sleep(delay).await;
        self.inner.notify(notification).await
    }

    async fn dismiss(&self, id: &NotificationId) -> Result<()> {
        self.inner.dismiss(id).await
    }
}

/// Re-notify on every pass so each pass has a delivery to wait on
fn repeat_every_pass() -> EngineConfig {
    EngineConfig { cooldown_interval: Duration::from_millis(1), ..Default::default() }
}

#[tokio::test(start_paused = true)]
async fn test_initial_pass_notifies_in_range_signal() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();

    assert_eq!(harness.engine.state(), PollingState::Polling);
    assert_eq!(harness.count_for("e1"), 1);
    assert_eq!(harness.sink.channels().len(), 1);
    assert!(harness.engine.cooldown_snapshot().contains_key(&SignalId::new("e1")));
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_suppresses_duplicate_notify() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();

    harness.advance(TICK).await;
    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 1);

    // Default cooldown is five minutes
    harness.advance(Duration::from_secs(270)).await;
    assert_eq!(harness.count_for("e1"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_imminent_deadline_overrides_cooldown() {
    let harness = Harness::new(vec![event_in(16)]);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.count_for("e1"), 1);

    // Still more than 15 minutes remaining, cooldown applies
    for _ in 0..3 {
        harness.advance(TICK).await;
    }
    assert_eq!(harness.count_for("e1"), 1);

    // Exactly 15 minutes remaining
    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 2);

    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 3);
    assert_eq!(
        harness.engine.cooldown_snapshot()[&SignalId::new("e1")],
        t0() + ChronoDuration::seconds(75)
    );
}

#[tokio::test(start_paused = true)]
async fn test_reminder_interval_gates_imminent_repeats() {
    let harness = Harness::new(vec![event_in(10)]);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();

    let report = harness.engine.evaluate_all_signals(false).await.unwrap();
    let outcome = report.outcome(&SignalId::new("e1")).unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Suppressed { reason: SuppressReason::CoolingDown });

    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 2);

    let report = harness.engine.evaluate_all_signals(false).await.unwrap();
    assert_eq!(report.notified().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_scenario_with_default_reminders() {
    let harness = Harness::new(vec![event_in(10)]);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.count_for("e1"), 1);

    let delivered = harness.sink.delivered();
    assert_eq!(delivered[0].title, "Event Ending Soon!");
    assert_eq!(delivered[0].subtitle, "0.0km away");

    // Inside the window the reminder interval equals one poll
    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 2);
    assert_eq!(harness.sink.live_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_scenario_with_longer_reminder_interval() {
    let config = EngineConfig { reminder_interval: Duration::from_secs(60), ..Default::default() };
    let harness = Harness::with_config(vec![event_in(10)], config);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();

    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 1);

    for _ in 0..3 {
        harness.advance(TICK).await;
    }
    assert_eq!(harness.count_for("e1"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_ended_and_not_started_signals_are_never_notified() {
    let signals = vec![
        Signal::event("ended", "Expo", HERE, t0() - ChronoDuration::minutes(1), ""),
        Signal::station_closure("future", "Metro", HERE, t0() + ChronoDuration::minutes(5), ""),
    ];
    let harness = Harness::new(signals);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();

    let report = harness.engine.evaluate_all_signals(true).await.unwrap();
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, OutcomeStatus::Suppressed { reason: SuppressReason::NotLive });
    }
    assert_eq!(harness.sink.delivered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_signal_is_ignored() {
    let far = Signal::event("far", "Expo", Coordinate::new(25.0192, 55.2011), t0(), "");
    let harness = Harness::new(vec![far]);
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.sink.delivered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_location_loss_stops_polling_and_clears_cooldowns() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);
    harness.engine.start_polling().await.unwrap();
    assert!(!harness.engine.cooldown_snapshot().is_empty());

    harness.tracker.stop_tracking().await;
    harness.advance(TICK).await;

    assert_eq!(harness.engine.state(), PollingState::Idle);
    assert!(harness.engine.cooldown_snapshot().is_empty());

    let err = harness.engine.evaluate_all_signals(false).await.unwrap_err();
    assert!(matches!(err, GeoradarError::LocationLost));
}

#[tokio::test(start_paused = true)]
async fn test_start_and_stop_are_idempotent() {
    let catalog = ScriptedCatalog::new(vec![event_in(60)]);
    let harness = Harness::with_catalog(catalog.clone(), EngineConfig::default());
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();
    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.count_for("e1"), 1);
    assert_eq!(catalog.calls(), 1);

    // One timer: one catalog read per tick
    harness.advance(TICK).await;
    harness.advance(TICK).await;
    assert_eq!(catalog.calls(), 3);

    harness.engine.stop_polling();
    harness.engine.stop_polling();
    assert_eq!(harness.engine.state(), PollingState::Idle);
    assert!(harness.engine.cooldown_snapshot().is_empty());

    harness.advance(TICK).await;
    harness.advance(TICK).await;
    assert_eq!(catalog.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_restart_begins_with_fresh_history() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();
    harness.engine.stop_polling();
    harness.engine.start_polling().await.unwrap();

    assert_eq!(harness.count_for("e1"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_fix_timeout_leaves_engine_idle() {
    let harness = Harness::new(vec![event_in(60)]);

    let err = harness.engine.start_polling().await.unwrap_err();

    assert!(matches!(err, GeoradarError::LocationTimeout { timeout_ms: 10_000 }));
    assert_eq!(harness.engine.state(), PollingState::Idle);
    assert_eq!(harness.sink.delivered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_first_fix_arriving_late_starts_polling() {
    let harness = Harness::new(vec![event_in(60)]);
    let tracker = harness.tracker.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        tracker.update_location(LocationFix::new(HERE, t0()));
    });

    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.engine.state(), PollingState::Polling);
    assert_eq!(harness.count_for("e1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_first_fix_wait_cancels_start() {
    let harness = Harness::new(vec![event_in(60)]);
    let engine = harness.engine.clone();
    let starting = tokio::spawn(async move { engine.start_polling().await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    harness.engine.stop_polling();
    harness.place_user(HERE);

    let result = starting.await.unwrap();
    assert!(matches!(result, Err(GeoradarError::StartCancelled)));
    assert_eq!(harness.engine.state(), PollingState::Idle);
    assert_eq!(harness.sink.delivered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_dispatch_is_retried_next_tick() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);
    harness.sink.set_failing(true);

    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.sink.delivered_count(), 0);
    assert!(harness.engine.cooldown_snapshot().is_empty());

    harness.sink.set_failing(false);
    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_catalog_failure_keeps_polling() {
    let catalog = ScriptedCatalog::new(vec![event_in(60)]);
    catalog.failing.store(true, Ordering::SeqCst);
    let harness = Harness::with_catalog(catalog.clone(), EngineConfig::default());
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.engine.state(), PollingState::Polling);
    assert_eq!(harness.sink.delivered_count(), 0);

    harness.advance(TICK).await;
    assert_eq!(harness.engine.state(), PollingState::Polling);

    catalog.failing.store(false, Ordering::SeqCst);
    harness.advance(TICK).await;
    assert_eq!(harness.count_for("e1"), 1);
    assert_eq!(catalog.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_signal_does_not_block_siblings() {
    let broken = Signal::event("bad", "Broken", Coordinate::new(123.0, 46.7), t0(), "");
    let harness = Harness::new(vec![broken, event_in(60)]);
    harness.place_user(HERE);

    let report = harness.engine.evaluate_all_signals(true).await.unwrap();

    assert_eq!(report.skipped_count(), 1);
    assert!(report.outcome(&SignalId::new("bad")).unwrap().eligibility.is_none());
    assert_eq!(report.notified_ids(), vec![&SignalId::new("e1")]);
    assert_eq!(
        report.outcome(&SignalId::new("e1")).unwrap().status,
        OutcomeStatus::Notified { reason: NotifyReason::InitialPass }
    );
}

#[tokio::test(start_paused = true)]
async fn test_tick_uses_location_snapshot() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);

    let report = harness.engine.evaluate_all_signals(true).await.unwrap();
    harness.place_user(Coordinate::new(25.0192, 55.2011));

    assert_eq!(report.location.coordinate, HERE);
    assert_eq!(report.outcome(&SignalId::new("e1")).unwrap().eligibility.unwrap().distance_km, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_demo_fixture_around_riyadh_tester() {
    let harness = Harness::new(demo_signals(t0()));
    harness.place_user(HERE);

    harness.engine.start_polling().await.unwrap();

    // Granada event sits on the user; the airport closure is ~16 km north
    assert_eq!(harness.count_for("1"), 1);
    assert_eq!(harness.count_for("2"), 0);
    assert_eq!(harness.count_for("3"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_config_is_rejected() {
    let clock = ManualClock::new(t0());
    let tracker =
        LocationTracker::new(Arc::new(SimulatedLocationProvider::new()), Arc::new(clock.clone()));
    let config = EngineConfig { temporal_window_minutes: 0, ..Default::default() };

    let result = SignalPollingEngine::new(
        config,
        tracker,
        Arc::new(StaticSignalCatalog::new(Vec::new())),
        Arc::new(MemoryNotificationSink::new()),
        Arc::new(clock),
    );
    assert!(matches!(result, Err(GeoradarError::ConfigInvalid { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_during_a_running_pass_are_dropped() {
    let catalog = ScriptedCatalog::new(vec![event_in(60)]);
    let sink = SlowSink::new(Duration::from_secs(40));
    let (clock, tracker, engine) =
        build_engine(catalog.clone(), sink.clone(), repeat_every_pass());
    tracker.update_location(LocationFix::new(HERE, clock.now()));

    engine.start_polling().await.unwrap();
    assert_eq!(catalog.calls(), 1);

    // This pass spans the timer ticks 15s and 30s after start
    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.evaluate_all_signals(false).await })
    };
    let report = running.await.unwrap().unwrap();
    assert_eq!(report.notified().count(), 1);
    assert_eq!(catalog.calls(), 2);
    assert_eq!(sink.inner.delivered_count(), 2);

    // The next tick finds no pass in progress
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(catalog.calls(), 3);

    engine.stop_polling();
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_pass_drops_remaining_sends() {
    let signals = vec![
        Signal::event("e1", "Expo", HERE, t0() + ChronoDuration::minutes(60), ""),
        Signal::event("e2", "Fair", HERE, t0() + ChronoDuration::minutes(60), ""),
    ];
    let catalog = Arc::new(StaticSignalCatalog::new(signals));
    let sink = SlowSink::new(Duration::ZERO);
    let (clock, tracker, engine) = build_engine(catalog, sink.clone(), repeat_every_pass());
    tracker.update_location(LocationFix::new(HERE, clock.now()));

    engine.start_polling().await.unwrap();
    assert_eq!(sink.inner.delivered_count(), 2);

    sink.set_delay(Duration::from_secs(40));
    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.evaluate_all_signals(false).await })
    };

    tokio::time::sleep(Duration::from_secs(20)).await;
    engine.stop_polling();

    let report = running.await.unwrap().unwrap();
    assert_eq!(
        report.outcome(&SignalId::new("e1")).unwrap().status,
        OutcomeStatus::Notified { reason: NotifyReason::CooldownElapsed }
    );
    assert_eq!(
        report.outcome(&SignalId::new("e2")).unwrap().status,
        OutcomeStatus::Suppressed { reason: SuppressReason::Stopped }
    );
    assert_eq!(sink.inner.delivered_count(), 3);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(sink.inner.delivered_count(), 3);
    assert_eq!(engine.state(), PollingState::Idle);
    assert!(engine.cooldown_snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_idle_evaluation_keeps_no_history() {
    let harness = Harness::new(vec![event_in(60)]);
    harness.place_user(HERE);

    let report = harness.engine.evaluate_all_signals(false).await.unwrap();
    assert_eq!(
        report.outcome(&SignalId::new("e1")).unwrap().status,
        OutcomeStatus::Notified { reason: NotifyReason::FirstSighting }
    );
    assert!(harness.engine.cooldown_snapshot().is_empty());

    let report = harness.engine.evaluate_all_signals(false).await.unwrap();
    assert_eq!(report.notified().count(), 1);
    assert_eq!(harness.count_for("e1"), 2);
    assert_eq!(harness.engine.state(), PollingState::Idle);

    harness.engine.start_polling().await.unwrap();
    assert_eq!(harness.count_for("e1"), 3);
    assert_eq!(harness.engine.cooldown_snapshot().len(), 1);
}
