//! Accumulating meter state (the register a reader sees on the device).

use hm_core::units::{Pressure, Volume, VolumeRate, m3, m3ps, s};

use crate::gauge::GaugeSpec;
use crate::sampler::Sample;

/// Total volume, latest pressure and the fixed gauge of a running meter.
///
/// Volume is accumulated in `f64` and never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    gauge: GaugeSpec,
    volume: Volume,
    pressure: Pressure,
    last_flow: VolumeRate,
}

impl Meter {
    /// State at t=0: zero volume, pressure and gauge from the first sample.
    pub fn initialize(sample: &Sample) -> Self {
        Self {
            gauge: sample.gauge,
            volume: m3(0.0),
            pressure: sample.pressure,
            last_flow: sample.flow,
        }
    }

    /// Add `flow x interval` to the register and take the sample's pressure.
    pub fn accumulate(&mut self, sample: &Sample, interval_s: u64) {
        debug_assert_eq!(sample.gauge.gauge, self.gauge.gauge);
        let flow = m3ps(sample.flow.value.max(0.0));
        self.volume += flow * s(interval_s as f64);
        self.pressure = sample.pressure;
        self.last_flow = flow;
    }

    pub fn gauge(&self) -> &GaugeSpec {
        &self.gauge
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    /// Flow of the most recent sample.
    pub fn last_flow(&self) -> VolumeRate {
        self.last_flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::Gauge;
    use crate::sampler::FlowSource;
    use hm_core::numeric::{Tolerances, nearly_equal};
    use hm_core::units::{bar, mps};

    fn sample(flow: f64, pressure_bar: f64) -> Sample {
        Sample {
            gauge: Gauge::Half.spec(),
            pressure: bar(pressure_bar),
            flow: m3ps(flow),
            demand: m3ps(flow),
            velocity: mps(0.0),
            source: FlowSource::Profile { index: 0 },
        }
    }

    #[test]
    fn initialize_starts_empty() {
        let meter = Meter::initialize(&sample(0.0002, 2.5));
        assert_eq!(meter.volume().value, 0.0);
        assert_eq!(meter.pressure(), bar(2.5));
        assert_eq!(meter.gauge().gauge, Gauge::Half);
    }

    #[test]
    fn accumulate_adds_flow_times_interval() {
        let mut meter = Meter::initialize(&sample(0.0, 1.0));
        meter.accumulate(&sample(0.0001, 3.0), 3_600);
        assert!((meter.volume().value - 0.36).abs() < 1e-12);
        assert_eq!(meter.pressure(), bar(3.0));
        assert_eq!(meter.last_flow(), m3ps(0.0001));
    }

    #[test]
    fn negative_flow_cannot_drain_the_register() {
        let mut meter = Meter::initialize(&sample(0.0, 1.0));
        meter.accumulate(&sample(0.001, 1.0), 10);
        let before = meter.volume().value;
        meter.accumulate(&sample(-0.5, 1.0), 10);
        assert_eq!(meter.volume().value, before);
    }

    #[test]
    fn long_runs_do_not_drift() {
        let mut meter = Meter::initialize(&sample(0.0, 1.0));
        let s = sample(0.000_088_357_293, 1.0);
        let n = 24 * 365;
        for _ in 0..n {
            meter.accumulate(&s, 3_600);
        }
        let expected = 0.000_088_357_293 * 3_600.0 * f64::from(n);
        let tol = Tolerances { abs: 0.0, rel: 1e-10 };
        assert!(nearly_equal(meter.volume().value, expected, tol));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::gauge::Gauge;
    use crate::sampler::FlowSource;
    use hm_core::units::{bar, mps};
    use proptest::prelude::*;

    fn sample(flow: f64) -> Sample {
        Sample {
            gauge: Gauge::Two.spec(),
            pressure: bar(2.0),
            flow: m3ps(flow),
            demand: m3ps(flow),
            velocity: mps(0.0),
            source: FlowSource::AirTrickle,
        }
    }

    proptest! {
        #[test]
        fn constant_flow_accumulates_linearly(
            flow in 0.0_f64..0.005,
            dt in 1_u64..7_200,
            n in 1_u32..200,
        ) {
            let mut meter = Meter::initialize(&sample(0.0));
            let s = sample(flow);
            for _ in 0..n {
                meter.accumulate(&s, dt);
            }
            let expected = flow * dt as f64 * f64::from(n);
            prop_assert!((meter.volume().value - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn volume_is_non_decreasing(
            steps in prop::collection::vec((0.0_f64..0.02, 1_u64..86_400), 1..100),
        ) {
            let mut meter = Meter::initialize(&sample(0.0));
            let mut previous = meter.volume().value;
            for (flow, dt) in steps {
                meter.accumulate(&sample(flow), dt);
                prop_assert!(meter.volume().value >= previous);
                previous = meter.volume().value;
            }
        }
    }
}
