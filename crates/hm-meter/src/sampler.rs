//! Instantaneous pressure/flow readings.
//!
//! One [`Sample`] is drawn per simulated step:
//! 1. pressure uniformly from the configured band
//! 2. base speed from the profile active at that hour of the day
//!    (or from the trickle range when air simulation applies)
//! 3. demand = bore area x base speed x flow multiplier
//! 4. flow = demand clamped to the gauge's rated maximum

use hm_controls::FlowController;
use hm_core::numeric::{ensure_non_negative, ensure_range};
use hm_core::units::{Pressure, Velocity, VolumeRate, bar, in_bar, m3ps, mps};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::MeterResult;
use crate::gauge::GaugeSpec;
use crate::profile::{ProfileSet, hour_of_day};

/// Uniform draw from `[lo, hi]`; a degenerate band yields `lo`.
pub(crate) fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Where the base speed of a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSource {
    /// Drawn from the profile at this index of the [`ProfileSet`].
    Profile { index: usize },
    /// Drawn from the trickle range (tap closed, air simulation on).
    AirTrickle,
}

/// One instantaneous reading. Transient; not stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub gauge: GaugeSpec,
    pub pressure: Pressure,
    /// Flow after the capacity clamp, `0 <= flow <= gauge.max_flow`
    pub flow: VolumeRate,
    /// Flow requested by the profile and multiplier before clamping
    pub demand: VolumeRate,
    /// Velocity consistent with the clamped flow
    pub velocity: Velocity,
    pub source: FlowSource,
}

impl Sample {
    /// True when demand exceeded the gauge rating.
    pub fn is_capacity_limited(&self) -> bool {
        self.demand.value > self.gauge.max_flow.value
    }
}

/// Speed range used for spurious readings while the tap is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrickleRange {
    pub speed_min: Velocity,
    pub speed_max: Velocity,
}

impl TrickleRange {
    pub fn new(speed_min_mps: f64, speed_max_mps: f64) -> Self {
        Self {
            speed_min: mps(speed_min_mps),
            speed_max: mps(speed_max_mps),
        }
    }
}

impl Default for TrickleRange {
    fn default() -> Self {
        Self::new(0.001, 0.005)
    }
}

/// Sampler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub pressure_min: Pressure,
    pub pressure_max: Pressure,
    /// Air simulation; `None` disables it.
    pub air: Option<TrickleRange>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            pressure_min: bar(0.0),
            pressure_max: bar(0.0),
            air: None,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> MeterResult<()> {
        ensure_range(self.pressure_min.value, self.pressure_max.value, "pressure band")?;
        if let Some(air) = &self.air {
            ensure_range(air.speed_min.value, air.speed_max.value, "trickle speed range")?;
            ensure_non_negative(air.speed_min.value, "trickle speed")?;
        }
        Ok(())
    }
}

/// Draws [`Sample`]s from a re-seedable deterministic RNG.
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplerConfig,
    rng: ChaCha8Rng,
}

impl Sampler {
    /// Sampler seeded from OS entropy.
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Sampler with a fixed seed; identical seeds give identical readings.
    pub fn with_seed(config: SamplerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Compute the reading for `simulated_second`.
    ///
    /// Fails only when no profile is active for that hour.
    pub fn sample(
        &mut self,
        simulated_second: u64,
        gauge: &GaugeSpec,
        profiles: &ProfileSet,
        controller: &FlowController,
    ) -> MeterResult<Sample> {
        let pressure = bar(draw_uniform(
            &mut self.rng,
            in_bar(self.config.pressure_min),
            in_bar(self.config.pressure_max),
        ));

        // One read keeps the multiplier consistent for the whole sample.
        let multiplier = controller.multiplier();

        let (speed, source) = match self.config.air {
            Some(air) if multiplier == 0.0 => {
                let v = draw_uniform(&mut self.rng, air.speed_min.value, air.speed_max.value);
                (mps(v), FlowSource::AirTrickle)
            }
            _ => {
                let hour = hour_of_day(simulated_second);
                let (index, profile) = profiles.active_entry(hour)?;
                let base = profile.draw_speed(&mut self.rng);
                (base * multiplier, FlowSource::Profile { index })
            }
        };

        let area = gauge.bore_area();
        let demand: VolumeRate = area * speed;
        let flow = m3ps(demand.value.min(gauge.max_flow.value).max(0.0));
        let velocity: Velocity = flow / area;

        Ok(Sample {
            gauge: *gauge,
            pressure,
            flow,
            demand,
            velocity,
            source,
        })
    }
}
