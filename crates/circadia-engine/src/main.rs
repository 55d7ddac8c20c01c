//! Playback engine binary for the Circadia simulation.
//!
//! Wires the recorded dataset, the simulation core, the playback driver
//! and the Observer API together, then drives playback until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `circadia-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load and index the dataset
//! 4. Build the simulation core
//! 5. Start the Observer API server
//! 6. Run the playback driver until shutdown

mod dataset;
mod error;
mod observer_sink;

use std::path::Path;
use std::sync::Arc;

use circadia_core::config::SimulationConfig;
use circadia_core::motion::RngSource;
use circadia_core::runner::{self, PlaybackCommand};
use circadia_core::scheduler::TickScheduler;
use circadia_core::simulation::SimulationCore;
use circadia_observer::server::ServerConfig;
use circadia_observer::state::{AppState, PlaybackSnapshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_sink::ObserverSink;

/// Config file looked up relative to the working directory.
const CONFIG_PATH: &str = "circadia-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, dataset loading, core
/// construction or observer startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    the file was found and report it once the subscriber exists.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("circadia-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        tick_minutes = config.playback.tick_minutes,
        frame_duration_ms = config.playback.frame_duration_ms,
        cycle_length = config.playback.cycle_length,
        seed = ?config.motion.seed,
        samples_path = %config.data.samples_path.display(),
        "Configuration loaded"
    );

    // 3. Load the dataset.
    let index = dataset::load(&config.data.samples_path)?;

    // 4. Build the simulation core.
    let rng = RngSource::from_seed_option(config.motion.seed);
    let mut core = SimulationCore::new(config.core(), index, rng)?;
    info!(
        min_time = core.min_time(),
        max_time = core.max_time(),
        days = core.day_options().len(),
        "Simulation core built"
    );

    // 5. Start the Observer API server.
    let (commands_tx, mut commands_rx) = runner::command_channel();
    let snapshot = PlaybackSnapshot {
        min_time: core.min_time(),
        max_time: core.max_time(),
        cycle_length: core.config().cycle_length,
        days: core.day_options(),
        entities: core.index().entities().clone(),
        ..PlaybackSnapshot::default()
    };
    let app_state = Arc::new(AppState::with_commands(snapshot, commands_tx.clone()));
    let server_config = ServerConfig {
        host: config.observer.host.clone(),
        port: config.observer.port,
    };
    let observer_handle =
        circadia_observer::startup::spawn_observer(server_config, Arc::clone(&app_state))
            .map_err(EngineError::from)?;

    // 6. Stop the driver on Ctrl-C.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        // The driver may already be gone; nothing left to stop then.
        let _ = commands_tx.send(PlaybackCommand::Shutdown).await;
    });

    // 7. Run playback.
    let mut sink = ObserverSink::new(app_state);
    let mut scheduler = TickScheduler::from_millis(config.playback.frame_duration_ms);
    let summary = runner::run_playback(&mut core, &mut commands_rx, &mut sink, &mut scheduler).await;

    observer_handle.abort();

    info!(
        end_reason = ?summary.end_reason,
        ticks = summary.ticks,
        frames = summary.frames,
        "circadia-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration from [`CONFIG_PATH`], falling back to defaults
/// (with environment overrides) when the file does not exist.
///
/// Returns the config and whether it was read from the file.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((SimulationConfig::from_file(config_path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}
