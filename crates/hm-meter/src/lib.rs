//! hm-meter: physical model of a residential water meter.
//!
//! Provides:
//! - Gauge table (nominal pipe size, bore, rated maximum flow)
//! - Time-of-day consumption profiles and their selection
//! - Sampler producing one instantaneous pressure/flow reading per step
//! - Meter accumulating sampled flow into total volume
//!
//! The sampler enforces the capacity clamp: a reading never exceeds the
//! rated maximum flow of the gauge in use, whatever the computed demand.
//!
//! # Example
//!
//! ```
//! use hm_controls::FlowController;
//! use hm_meter::{GaugeSpec, Meter, ProfileSet, Sampler, SamplerConfig};
//!
//! let gauge = GaugeSpec::lookup("3/4").unwrap();
//! let profiles = ProfileSet::standard_day();
//! let controller = FlowController::default();
//! let mut sampler = Sampler::with_seed(SamplerConfig::default(), 7);
//!
//! let first = sampler.sample(0, &gauge, &profiles, &controller).unwrap();
//! let mut meter = Meter::initialize(&first);
//!
//! let next = sampler.sample(60, &gauge, &profiles, &controller).unwrap();
//! meter.accumulate(&next, 60);
//! assert!(meter.volume().value >= 0.0);
//! ```

pub mod error;
pub mod gauge;
pub mod meter;
pub mod profile;
pub mod sampler;

// Re-exports
pub use error::{MeterError, MeterResult};
pub use gauge::{Gauge, GaugeSpec};
pub use meter::Meter;
pub use profile::{
    ConsumptionProfile, HOURS_PER_DAY, ProfileSet, SECONDS_PER_HOUR, active_profile, hour_of_day,
};
pub use sampler::{FlowSource, Sample, Sampler, SamplerConfig, TrickleRange};
