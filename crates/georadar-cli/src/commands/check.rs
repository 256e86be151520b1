//! Check command implementation

use crate::cli::CheckArgs;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::CheckRow;
use crate::sources::CatalogSource;
use anyhow::Result;
use georadar_core::config::LayeredConfig;
use georadar_core::models::{LocationFix, TemporalOffset};
use georadar_core::{Clock, SystemClock};
use georadar_engine::{LocationTracker, OutcomeStatus, SignalOutcome, SignalPollingEngine};
use georadar_store::{MemoryNotificationSink, SimulatedLocationProvider};
use std::sync::Arc;

use super::{engine_config, parse_coordinate};

pub async fn execute(args: CheckArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let engine_config = engine_config(config)?;
    let here = parse_coordinate("observer", args.lat, args.long)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = CatalogSource::resolve(&args.catalog, config);
    let catalog = source.open(clock.now());

    // Dry run: fixes are fed directly and deliveries are only recorded
    let tracker = LocationTracker::new(Arc::new(SimulatedLocationProvider::new()), clock.clone());
    tracker.update_location(LocationFix::new(here, clock.now()));
    let sink = Arc::new(MemoryNotificationSink::new());
    let engine = SignalPollingEngine::new(engine_config, tracker, catalog, sink, clock)?;

    let report = engine
        .evaluate_all_signals(true)
        .await
        .map_err(|e| errors::catalog_unavailable(&source.to_string(), &e))?;

    if output.is_json() {
        return output.result(&report);
    }

    output.section(format!("Signals near {} ({})", here, source));
    let rows: Vec<CheckRow> = report.outcomes.iter().map(check_row).collect();
    output.table(rows);

    let would_notify = report.notified().count();
    let summary = format!("{} of {} signals would notify", would_notify, report.outcomes.len());
    if would_notify > 0 {
        output.success(summary);
    } else {
        output.info(summary);
    }
    if report.skipped_count() > 0 {
        output.warning(format!("{} malformed signals skipped", report.skipped_count()));
    }

    Ok(())
}

fn check_row(outcome: &SignalOutcome) -> CheckRow {
    let (distance, when) = match &outcome.eligibility {
        Some(result) => (format!("{:.3} km", result.distance_km), describe_offset(result.offset)),
        None => ("-".to_string(), "-".to_string()),
    };

    let decision = match &outcome.status {
        OutcomeStatus::Notified { reason } => format!("notify ({:?})", reason),
        OutcomeStatus::Suppressed { reason } => format!("skip ({:?})", reason),
        OutcomeStatus::Skipped { reason } => format!("malformed: {}", reason),
        OutcomeStatus::Failed { error } => format!("failed: {}", error),
    };

    CheckRow {
        id: outcome.signal_id.to_string(),
        name: outcome.name.clone(),
        kind: outcome.kind.to_string(),
        distance,
        when,
        decision,
    }
}

fn describe_offset(offset: TemporalOffset) -> String {
    match offset {
        TemporalOffset::MinutesRemaining(m) if m > 0.0 => format!("ends in {:.1} min", m),
        TemporalOffset::MinutesRemaining(m) => format!("ended {:.1} min ago", -m),
        TemporalOffset::MinutesElapsed(m) if m > 0.0 => format!("started {:.1} min ago", m),
        TemporalOffset::MinutesElapsed(m) => format!("starts in {:.1} min", -m),
    }
}
