//! Watch command implementation

use crate::cli::WatchArgs;
use crate::errors;
use crate::output::OutputWriter;
use crate::sources::CatalogSource;
use crate::terminal::TerminalNotificationSink;
use anyhow::Result;
use georadar_core::config::LayeredConfig;
use georadar_core::models::UpdateOptions;
use georadar_core::{Clock, SystemClock};
use georadar_engine::{LocationTracker, SignalPollingEngine};
use georadar_store::SimulatedLocationProvider;
use std::sync::Arc;
use std::time::Duration;

use super::{engine_config, parse_coordinate};

/// How often the command checks whether the engine stopped on its own
const STATE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

pub async fn execute(args: WatchArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let engine_config = engine_config(config)?;
    let here = parse_coordinate("observer", args.lat, args.long)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = CatalogSource::resolve(&args.catalog, config);
    let catalog = source.open(clock.now());

    let provider = Arc::new(SimulatedLocationProvider::stationary(here).with_clock(clock.clone()));
    let options = UpdateOptions { interval: engine_config.polling_interval, ..Default::default() };
    let tracker = LocationTracker::with_options(provider, clock.clone(), options);
    tracker.start_tracking().await.map_err(|e| errors::monitoring_failed(&e))?;

    let sink = Arc::new(TerminalNotificationSink::new(output.is_json()));
    let polling_interval = engine_config.polling_interval;
    let engine = SignalPollingEngine::new(engine_config, tracker.clone(), catalog, sink, clock)?;

    output.info(format!(
        "Watching signals from {} at {} every {}s (Ctrl-C to stop)",
        source,
        here,
        polling_interval.as_secs_f64()
    ));

    if let Err(e) = engine.start_polling().await {
        tracker.stop_tracking().await;
        return Err(errors::monitoring_failed(&e).into());
    }

    let deadline = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    let engine_stopped = async {
        let mut ticker = tokio::time::interval(STATE_CHECK_INTERVAL);
        while engine.is_polling() {
            ticker.tick().await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => output.info("Interrupted"),
        _ = deadline => output.info("Watch duration elapsed"),
        _ = engine_stopped => output.warning("Polling stopped: location lost"),
    }

    engine.stop_polling();
    engine.dismiss_notifications().await;
    tracker.stop_tracking().await;
    output.success("Stopped watching");

    Ok(())
}
