//! Run execution service.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hm_controls::FlowController;
use hm_project::SimulatorConfig;
use hm_sim::{
    EngineConfig, RunDuration, RunOptions, RunSummary, SimulationEngine, StopSignal, run_loop,
    stop_channel,
};
use tracing::info;

use crate::console::ConsoleLogger;
use crate::control::spawn_control;
use crate::error::AppResult;
use crate::persistence::{PersistenceStats, SnapshotPersistence};

/// Command-line adjustments on top of the configuration file.
#[derive(Debug, Clone)]
pub struct RunOverrides {
    pub seed: Option<u64>,
    /// Initial tap opening, 0-100
    pub flow_percent: Option<f64>,
    /// Replaces `intervaloAtualizacao` as the wall-clock pacing
    pub interval: Option<Duration>,
    pub max_ticks: Option<u64>,
    /// Parent of the `Medicoes_<matricula>` folder
    pub output_dir: PathBuf,
    /// Read flow commands from stdin while running
    pub interactive: bool,
}

impl Default for RunOverrides {
    fn default() -> Self {
        Self {
            seed: None,
            flow_percent: None,
            interval: None,
            max_ticks: None,
            output_dir: PathBuf::from("."),
            interactive: true,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResponse {
    pub summary: RunSummary,
    pub snapshots_written: u64,
    pub snapshots_failed: u64,
}

/// Engine settings for a validated configuration.
pub fn engine_config(config: &SimulatorConfig, seed: Option<u64>) -> AppResult<EngineConfig> {
    Ok(EngineConfig {
        gauge: config.gauge_spec(),
        profiles: config.profile_set(),
        sampler: config.sampler_config(),
        time_scale_s: config.time_scale_s,
        run_duration: RunDuration::from_seconds(config.run_duration_s)?,
        seed,
    })
}

/// Build an engine with the console logger and snapshot persistence
/// registered, in that order.
pub fn build_engine<W>(
    config: &SimulatorConfig,
    overrides: &RunOverrides,
    controller: Arc<FlowController>,
    console: W,
) -> AppResult<(SimulationEngine, Arc<PersistenceStats>)>
where
    W: Write + Send + 'static,
{
    let engine_config = engine_config(config, overrides.seed)?;
    let run_duration = engine_config.run_duration;
    let mut engine = SimulationEngine::new(engine_config, controller)?;

    engine.register_observer(Box::new(ConsoleLogger::new(
        console,
        config.update_interval_s,
        run_duration,
    )));
    let persistence = SnapshotPersistence::new(&overrides.output_dir, config.meter_id.as_deref())?;
    let stats = persistence.stats();
    engine.register_observer(Box::new(persistence));
    Ok((engine, stats))
}

/// Run a validated configuration to completion or until `stop` fires.
pub fn run_with_config<W>(
    config: &SimulatorConfig,
    overrides: &RunOverrides,
    controller: Arc<FlowController>,
    console: W,
    stop: &StopSignal,
) -> AppResult<RunResponse>
where
    W: Write + Send + 'static,
{
    let (mut engine, stats) = build_engine(config, overrides, controller, console)?;
    let options = RunOptions {
        pacing: overrides
            .interval
            .unwrap_or(Duration::from_secs(config.update_interval_s)),
        max_ticks: overrides.max_ticks,
    };
    let summary = run_loop(&mut engine, &options, stop)?;
    Ok(RunResponse {
        summary,
        snapshots_written: stats.written(),
        snapshots_failed: stats.failed(),
    })
}

/// Load `config_path`, then run it against stdout (and stdin when interactive).
pub fn run(config_path: &Path, overrides: &RunOverrides) -> AppResult<RunResponse> {
    let config = hm_project::load_file(config_path)?;
    let controller = Arc::new(FlowController::new(overrides.flow_percent.unwrap_or(100.0)));
    let (handle, signal) = stop_channel();

    if overrides.interactive {
        // Not joined; the reader may stay blocked on stdin after the run.
        spawn_control(io::BufReader::new(io::stdin()), controller.clone(), handle)?;
        info!("flow control: type 0-100, +N/-N or q to stop");
    } else {
        drop(handle);
    }

    run_with_config(&config, overrides, controller, io::stdout(), &signal)
}
