//! Signal polling state machine

use chrono::{DateTime, Utc};
use georadar_core::config::EngineConfig;
use georadar_core::error::{GeoradarError, Result};
use georadar_core::models::{Signal, SignalId};
use georadar_core::ports::{NotificationSink, SignalCatalog};
use georadar_core::Clock;
use georadar_geo::validate_coordinate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::cooldown::CooldownTable;
use crate::dispatcher::NotificationDispatcher;
use crate::policy::{GeofenceEligibilityPolicy, NotifyRule, SuppressReason};
use crate::report::{OutcomeStatus, SignalOutcome, TickReport};
use crate::tracker::LocationTracker;

/// Lifecycle of the polling engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollingState {
    Idle,
    Polling,
}

/// Periodically evaluates the signal catalog against the tracked location and
/// raises deduplicated notifications.
///
/// At most one polling session exists at a time. Cloning shares the session.
#[derive(Clone)]
pub struct SignalPollingEngine {
    shared: Arc<Shared>,
}

struct Shared {
    config: EngineConfig,
    policy: GeofenceEligibilityPolicy,
    rule: NotifyRule,
    tracker: LocationTracker,
    catalog: Arc<dyn SignalCatalog>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    cooldowns: Mutex<CooldownTable>,
    session: Mutex<Option<PollSession>>,

    /// Bumped on every start and stop so in-flight work can tell it is stale
    epoch: AtomicU64,

    /// Serializes `start_polling` calls
    start_gate: tokio::sync::Mutex<()>,

    /// Held for the duration of a pass; overlapping timer ticks are dropped
    tick_gate: tokio::sync::Mutex<()>,
}

struct PollSession {
    epoch: u64,
    stop: oneshot::Sender<()>,
}

impl SignalPollingEngine {
    pub fn new(
        config: EngineConfig,
        tracker: LocationTracker,
        catalog: Arc<dyn SignalCatalog>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                policy: GeofenceEligibilityPolicy::from_config(&config),
                rule: NotifyRule::from_config(&config),
                config,
                tracker,
                catalog,
                dispatcher: NotificationDispatcher::new(sink),
                clock,
                cooldowns: Mutex::new(CooldownTable::new()),
                session: Mutex::new(None),
                epoch: AtomicU64::new(0),
                start_gate: tokio::sync::Mutex::new(()),
                tick_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.shared.tracker
    }

    pub fn state(&self) -> PollingState {
        if self.shared.session().is_some() {
            PollingState::Polling
        } else {
            PollingState::Idle
        }
    }

    pub fn is_polling(&self) -> bool {
        self.state() == PollingState::Polling
    }

    /// Begin polling.
    ///
    /// Waits for a first fix, runs an initial pass that bypasses cooldowns, then
    /// evaluates every polling interval. Returns immediately if already polling.
    /// On failure the engine stays idle.
    pub async fn start_polling(&self) -> Result<()> {
        let shared = &self.shared;
        let _gate = shared.start_gate.lock().await;

        if self.is_polling() {
            debug!("Polling already active");
            return Ok(());
        }

        let epoch = shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        shared.cooldowns().clear();

        if let Err(e) = shared.dispatcher.configure().await {
            warn!(
                error = %e,
                channel = %shared.dispatcher.channel().id,
                "Failed to configure notification channel"
            );
        }

        let timeout = shared.config.first_fix_timeout;
        let fix = shared.tracker.wait_for_first_fix(timeout).await.map_err(|e| {
            error!(error = %e, "No location fix, polling not started");
            e
        })?;
        info!(lat = fix.coordinate.lat, long = fix.coordinate.long, "Got first location fix");

        if !shared.is_current(epoch) {
            return Err(GeoradarError::StartCancelled);
        }

        {
            let _tick = shared.tick_gate.lock().await;
            match shared.evaluate(true, epoch, true).await {
                Ok(report) => log_report(&report),
                Err(GeoradarError::LocationLost) => return Err(GeoradarError::LocationLost),
                Err(e) => warn!(error = %e, "Initial evaluation failed, retrying on next tick"),
            }
        }

        let mut session = shared.session();
        if !shared.is_current(epoch) {
            return Err(GeoradarError::StartCancelled);
        }

        let (stop, stop_rx) = oneshot::channel();
        let period = shared.config.polling_interval;
        tokio::spawn(run_loop(Arc::downgrade(&self.shared), epoch, period, stop_rx));
        *session = Some(PollSession { epoch, stop });

        info!(
            interval_ms = period.as_millis() as u64,
            range_km = shared.config.range_threshold_km,
            "Started polling for signals"
        );
        Ok(())
    }

    /// Cancel polling and clear all cooldowns. No-op while idle.
    ///
    /// A start still waiting for its first fix fails with
    /// [`GeoradarError::StartCancelled`]. Sends from a pass already in flight
    /// are dropped.
    pub fn stop_polling(&self) {
        self.shared.stop_polling();
    }

    /// Run one evaluation pass now.
    ///
    /// `is_initial` lifts cooldown suppression. Waits for a pass already in
    /// progress to finish first.
    ///
    /// While idle this is a dry run: notifications are still sent, but no
    /// cooldown history is kept and a missing location leaves the engine as is.
    pub async fn evaluate_all_signals(&self, is_initial: bool) -> Result<TickReport> {
        let _tick = self.shared.tick_gate.lock().await;
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        let in_session = self.is_polling();
        self.shared.evaluate(is_initial, epoch, in_session).await
    }

    /// Last successful notification time per signal
    pub fn cooldown_snapshot(&self) -> HashMap<SignalId, DateTime<Utc>> {
        self.shared.cooldowns().snapshot()
    }

    /// Remove every notification the engine delivered
    pub async fn dismiss_notifications(&self) {
        self.shared.dispatcher.dismiss_all().await;
    }
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, Option<PollSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cooldowns(&self) -> MutexGuard<'_, CooldownTable> {
        self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn stop_polling(&self) {
        let session = {
            let mut session = self.session();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            session.take()
        };
        self.cooldowns().clear();

        if let Some(session) = session {
            // The loop may already have exited on its own
            let _ = session.stop.send(());
            info!(epoch = session.epoch, "Stopped polling for signals");
        }
    }

    async fn evaluate(&self, is_initial: bool, epoch: u64, in_session: bool) -> Result<TickReport> {
        let now = self.clock.now();

        let Some(location) = self.tracker.current_location() else {
            if in_session && self.is_current(epoch) {
                error!("Location unavailable, stopping polling");
                self.stop_polling();
            } else {
                warn!("Location unavailable, skipping evaluation");
            }
            return Err(GeoradarError::LocationLost);
        };

        let signals = self.catalog.list_signals().await.map_err(|e| {
            warn!(error = %e, "Failed to fetch signals");
            e
        })?;

        let mut report = TickReport::new(now, is_initial, location);
        for signal in &signals {
            let outcome = self.evaluate_signal(signal, &report, epoch, in_session).await;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    async fn evaluate_signal(
        &self,
        signal: &Signal,
        report: &TickReport,
        epoch: u64,
        in_session: bool,
    ) -> SignalOutcome {
        let mut outcome = SignalOutcome {
            signal_id: signal.id.clone(),
            name: signal.name.clone(),
            kind: signal.kind.label(),
            eligibility: None,
            status: OutcomeStatus::Suppressed { reason: SuppressReason::OutOfRange },
        };

        let validation = validate_coordinate(&signal.coordinates);
        if !validation.is_valid {
            let err = GeoradarError::MalformedSignal {
                signal_id: signal.id.to_string(),
                reason: validation.summary(),
            };
            warn!(error = %err, "Skipping signal");
            outcome.status = OutcomeStatus::Skipped { reason: validation.summary() };
            return outcome;
        }

        let now = report.at;
        let result = self.policy.evaluate(signal, report.location.coordinate, now);
        outcome.eligibility = Some(result);

        let elapsed_ms = self.cooldowns().elapsed_ms(&signal.id, now);
        let reason = match self.rule.decide(&result, elapsed_ms, report.is_initial) {
            Ok(reason) => reason,
            Err(reason) => {
                debug!(
                    signal_id = %signal.id,
                    distance_km = result.distance_km,
                    ?reason,
                    "Signal not notified"
                );
                outcome.status = OutcomeStatus::Suppressed { reason };
                return outcome;
            }
        };

        if !self.is_current(epoch) {
            debug!(signal_id = %signal.id, "Polling stopped, dropping notification");
            outcome.status = OutcomeStatus::Suppressed { reason: SuppressReason::Stopped };
            return outcome;
        }

        match self.dispatcher.dispatch(signal, result.distance_km).await {
            Ok(_) => {
                if in_session && self.is_current(epoch) {
                    self.cooldowns().record(signal.id.clone(), now);
                }
                info!(
                    signal_id = %signal.id,
                    name = %signal.name,
                    distance_km = result.distance_km,
                    ?reason,
                    "Signal notified"
                );
                outcome.status = OutcomeStatus::Notified { reason };
            }
            Err(e) => {
                warn!(signal_id = %signal.id, error = %e, "Failed to deliver notification");
                outcome.status = OutcomeStatus::Failed { error: e.to_string() };
            }
        }

        outcome
    }
}

async fn run_loop(
    shared: Weak<Shared>,
    epoch: u64,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let Some(shared) = shared.upgrade() else { break };
        if !shared.is_current(epoch) {
            break;
        }

        let Ok(_tick) = shared.tick_gate.try_lock() else {
            debug!("Previous evaluation still running, skipping tick");
            continue;
        };

        match shared.evaluate(false, epoch, true).await {
            Ok(report) => log_report(&report),
            Err(GeoradarError::LocationLost) => break,
            Err(e) if e.is_transient() => {
                debug!(error = %e, "Evaluation failed, retrying on next tick")
            }
            Err(e) => warn!(error = %e, "Evaluation failed"),
        }
    }

    debug!(epoch, "Polling loop exited");
}

fn log_report(report: &TickReport) {
    debug!(
        initial = report.is_initial,
        evaluated = report.evaluated(),
        notified = report.notified().count(),
        suppressed = report.suppressed_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "Evaluation pass complete"
    );
}
