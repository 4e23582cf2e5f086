//! Simulation engine: the time-stepped core loop.
//!
//! Each advance moves simulated time forward by the configured step, draws a
//! fresh sample for the new instant, accumulates `flow x step` into the meter
//! and notifies observers. Simulated time is decoupled from wall-clock pacing,
//! which belongs to [`crate::driver`].

use std::sync::Arc;

use hm_controls::FlowController;
use hm_meter::{GaugeSpec, Meter, ProfileSet, Sampler, SamplerConfig};
use tracing::{debug, info};

use crate::error::{SimError, SimResult};
use crate::observer::{MeterObserver, MeterSnapshot};

/// How long a run lasts in simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDuration {
    /// Finished once elapsed time reaches this many seconds.
    Bounded(u64),
    /// Never finishes on its own.
    Unbounded,
}

impl RunDuration {
    /// Decode the configuration convention: `-1` means unbounded.
    pub fn from_seconds(seconds: i64) -> SimResult<Self> {
        match seconds {
            -1 => Ok(Self::Unbounded),
            s if s >= 0 => Ok(Self::Bounded(s as u64)),
            _ => Err(SimError::InvalidArg {
                what: "run duration must be -1 (unbounded) or non-negative",
            }),
        }
    }

    pub fn is_reached(&self, elapsed_s: u64) -> bool {
        match *self {
            Self::Bounded(limit) => elapsed_s >= limit,
            Self::Unbounded => false,
        }
    }
}

/// Everything the engine needs to build its meter model.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub gauge: GaugeSpec,
    pub profiles: ProfileSet,
    pub sampler: SamplerConfig,
    /// Simulated seconds per advance
    pub time_scale_s: u64,
    pub run_duration: RunDuration,
    /// Fixed RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Config with the built-in day, default sampler and an unbounded run.
    pub fn new(gauge: GaugeSpec, time_scale_s: u64) -> Self {
        Self {
            gauge,
            profiles: ProfileSet::standard_day(),
            sampler: SamplerConfig::default(),
            time_scale_s,
            run_duration: RunDuration::Unbounded,
            seed: None,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.time_scale_s == 0 {
            return Err(SimError::InvalidArg {
                what: "time scale must be at least one second",
            });
        }
        self.profiles.validate()?;
        self.sampler.validate()?;
        Ok(())
    }
}

/// Lifecycle of a [`SimulationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    NotStarted,
    Running,
    Finished,
}

/// Owns the meter, the sampler and the observer list of one run.
pub struct SimulationEngine {
    config: EngineConfig,
    controller: Arc<FlowController>,
    sampler: Sampler,
    meter: Option<Meter>,
    observers: Vec<Box<dyn MeterObserver>>,
    elapsed_s: u64,
    ticks: u64,
    phase: EnginePhase,
    announced: bool,
}

impl SimulationEngine {
    /// Validate `config` and build an engine in [`EnginePhase::NotStarted`].
    pub fn new(config: EngineConfig, controller: Arc<FlowController>) -> SimResult<Self> {
        config.validate()?;
        let sampler = match config.seed {
            Some(seed) => Sampler::with_seed(config.sampler.clone(), seed),
            None => Sampler::new(config.sampler.clone()),
        };
        Ok(Self {
            config,
            controller,
            sampler,
            meter: None,
            observers: Vec::new(),
            elapsed_s: 0,
            ticks: 0,
            phase: EnginePhase::NotStarted,
            announced: false,
        })
    }

    /// Build and initialize in one call.
    pub fn start(config: EngineConfig, controller: Arc<FlowController>) -> SimResult<Self> {
        let mut engine = Self::new(config, controller)?;
        engine.initialize()?;
        Ok(engine)
    }

    /// Take the t=0 sample and create the meter with zero volume.
    pub fn initialize(&mut self) -> SimResult<()> {
        if self.phase != EnginePhase::NotStarted {
            return Err(SimError::InvalidState {
                what: "engine already initialized",
            });
        }
        let sample = self.sampler.sample(
            0,
            &self.config.gauge,
            &self.config.profiles,
            &self.controller,
        )?;
        self.meter = Some(Meter::initialize(&sample));
        self.elapsed_s = 0;
        self.ticks = 0;
        self.announced = false;
        self.phase = EnginePhase::Running;
        info!(
            gauge = %self.config.gauge.gauge,
            time_scale_s = self.config.time_scale_s,
            duration = ?self.config.run_duration,
            "meter initialized"
        );
        Ok(())
    }

    /// Append an observer; notification follows registration order.
    pub fn register_observer(&mut self, observer: Box<dyn MeterObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Deliver the current snapshot to every observer.
    pub fn notify_observers(&mut self) -> SimResult<()> {
        let snapshot = self.snapshot().ok_or(SimError::InvalidState {
            what: "no meter before initialization",
        })?;
        for observer in &mut self.observers {
            observer.on_tick(&snapshot, self.elapsed_s);
        }
        self.announced = true;
        Ok(())
    }

    /// True once observers have seen at least one snapshot of this run.
    pub fn has_announced(&self) -> bool {
        self.announced
    }

    /// One simulation step.
    ///
    /// A sampling failure (no active profile) leaves time and volume
    /// untouched and is returned to the caller.
    pub fn advance(&mut self) -> SimResult<()> {
        if self.phase != EnginePhase::Running {
            return Err(SimError::InvalidState {
                what: "advance requires a running engine",
            });
        }
        let step = self.config.time_scale_s;
        let next_elapsed = self.elapsed_s.checked_add(step).ok_or(SimError::InvalidState {
            what: "elapsed time overflow",
        })?;
        let sample = self.sampler.sample(
            next_elapsed,
            &self.config.gauge,
            &self.config.profiles,
            &self.controller,
        )?;
        let meter = self.meter.as_mut().ok_or(SimError::InvalidState {
            what: "no meter before initialization",
        })?;
        meter.accumulate(&sample, step);
        self.elapsed_s = next_elapsed;
        self.ticks += 1;
        debug!(
            tick = self.ticks,
            elapsed_s = self.elapsed_s,
            flow_m3ps = sample.flow.value,
            volume_m3 = meter.volume().value,
            capacity_limited = sample.is_capacity_limited(),
            "advanced"
        );
        self.notify_observers()
    }

    /// True once elapsed time reaches a bounded run duration.
    pub fn is_finished(&self) -> bool {
        self.config.run_duration.is_reached(self.elapsed_s)
    }

    /// Tell observers the run is over. Only the first call notifies.
    pub fn notify_finished(&mut self) -> SimResult<()> {
        match self.phase {
            EnginePhase::Finished => return Ok(()),
            EnginePhase::NotStarted => {
                return Err(SimError::InvalidState {
                    what: "cannot finish a run that never started",
                });
            }
            EnginePhase::Running => {}
        }
        self.phase = EnginePhase::Finished;
        let snapshot = self.snapshot().ok_or(SimError::InvalidState {
            what: "no meter before initialization",
        })?;
        info!(
            ticks = self.ticks,
            elapsed_s = self.elapsed_s,
            volume_m3 = snapshot.volume.value,
            "simulation finished"
        );
        for observer in &mut self.observers {
            observer.on_finished(&snapshot);
        }
        Ok(())
    }

    /// Current meter state, once initialized.
    pub fn snapshot(&self) -> Option<MeterSnapshot> {
        self.meter
            .as_ref()
            .map(|meter| MeterSnapshot::of(meter, self.elapsed_s, self.ticks))
    }

    /// Restart the sampler's random sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.sampler.reseed(seed);
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_s
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::SnapshotRecorder;
    use hm_meter::{ConsumptionProfile, Gauge};

    fn flat_config(speed: f64, step: u64) -> EngineConfig {
        EngineConfig {
            profiles: ProfileSet::new(vec![ConsumptionProfile::new("flat", speed, speed, 0, 23)]),
            seed: Some(1),
            ..EngineConfig::new(Gauge::Half.spec(), step)
        }
    }

    #[test]
    fn run_duration_decoding() {
        assert_eq!(RunDuration::from_seconds(-1), Ok(RunDuration::Unbounded));
        assert_eq!(RunDuration::from_seconds(0), Ok(RunDuration::Bounded(0)));
        assert_eq!(RunDuration::from_seconds(86_400), Ok(RunDuration::Bounded(86_400)));
        assert!(RunDuration::from_seconds(-2).is_err());
    }

    #[test]
    fn new_rejects_zero_step_and_gaps() {
        let controller = Arc::new(FlowController::default());
        let err = SimulationEngine::new(flat_config(0.5, 0), controller.clone()).err();
        assert!(matches!(err, Some(SimError::InvalidArg { .. })));

        let mut config = flat_config(0.5, 60);
        config.profiles = ProfileSet::new(vec![ConsumptionProfile::new("am", 0.1, 0.2, 0, 11)]);
        let err = SimulationEngine::new(config, controller).err();
        assert_eq!(
            err,
            Some(SimError::Meter(hm_meter::MeterError::NoActiveProfile { hour: 12 }))
        );
    }

    #[test]
    fn lifecycle_is_enforced() {
        let controller = Arc::new(FlowController::default());
        let mut engine = SimulationEngine::new(flat_config(0.5, 60), controller).unwrap();
        assert_eq!(engine.phase(), EnginePhase::NotStarted);
        assert!(engine.snapshot().is_none());
        assert!(matches!(engine.advance(), Err(SimError::InvalidState { .. })));
        assert!(matches!(engine.notify_finished(), Err(SimError::InvalidState { .. })));

        engine.initialize().unwrap();
        assert_eq!(engine.phase(), EnginePhase::Running);
        assert!(matches!(engine.initialize(), Err(SimError::InvalidState { .. })));

        engine.advance().unwrap();
        engine.notify_finished().unwrap();
        assert_eq!(engine.phase(), EnginePhase::Finished);
        assert!(matches!(engine.advance(), Err(SimError::InvalidState { .. })));
    }

    #[test]
    fn advance_moves_time_and_volume() {
        let controller = Arc::new(FlowController::default());
        let mut engine = SimulationEngine::start(flat_config(0.5, 3_600), controller).unwrap();
        let initial = engine.snapshot().unwrap();
        assert_eq!(initial.volume.value, 0.0);
        assert_eq!(initial.elapsed_s, 0);

        engine.advance().unwrap();
        engine.advance().unwrap();
        let snap = engine.snapshot().unwrap();
        assert_eq!(snap.elapsed_s, 7_200);
        assert_eq!(snap.tick, 2);
        let area = Gauge::Half.spec().bore_area().value;
        assert!((snap.volume.value - area * 0.5 * 7_200.0).abs() < 1e-12);
    }

    #[test]
    fn finish_notifies_exactly_once() {
        let controller = Arc::new(FlowController::default());
        let mut engine = SimulationEngine::start(flat_config(0.5, 60), controller).unwrap();
        let recorder = SnapshotRecorder::new();
        engine.register_observer(Box::new(recorder.clone()));

        engine.advance().unwrap();
        engine.notify_finished().unwrap();
        engine.notify_finished().unwrap();

        let record = recorder.record();
        assert_eq!(record.ticks.len(), 1);
        assert_eq!(record.finished.map(|s| s.tick), Some(1));
    }

    #[test]
    fn elapsed_overflow_is_an_error() {
        let controller = Arc::new(FlowController::default());
        let mut engine =
            SimulationEngine::start(flat_config(0.5, u64::MAX - 1), controller).unwrap();
        engine.advance().unwrap();
        let before = engine.snapshot().unwrap();

        assert!(matches!(engine.advance(), Err(SimError::InvalidState { .. })));
        assert_eq!(engine.snapshot(), Some(before));
        assert_eq!(engine.elapsed_seconds(), u64::MAX - 1);
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn announcement_is_tracked_per_run() {
        let controller = Arc::new(FlowController::default());
        let mut engine = SimulationEngine::start(flat_config(0.5, 60), controller).unwrap();
        assert!(!engine.has_announced());
        engine.notify_observers().unwrap();
        assert!(engine.has_announced());
    }

    #[test]
    fn unbounded_runs_never_finish() {
        let controller = Arc::new(FlowController::default());
        let mut engine = SimulationEngine::start(flat_config(0.5, 86_400), controller).unwrap();
        for _ in 0..100 {
            engine.advance().unwrap();
            assert!(!engine.is_finished());
        }
    }

    #[test]
    fn reseed_replays_the_sequence() {
        let config = EngineConfig {
            seed: Some(5),
            ..EngineConfig::new(Gauge::Two.spec(), 900)
        };
        let controller = Arc::new(FlowController::default());
        let mut a = SimulationEngine::start(config.clone(), controller.clone()).unwrap();
        let mut b = SimulationEngine::new(config, controller).unwrap();
        b.reseed(5);
        b.initialize().unwrap();
        b.reseed(5);
        a.reseed(5);
        for _ in 0..50 {
            a.advance().unwrap();
            b.advance().unwrap();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
