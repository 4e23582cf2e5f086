//! Gauge table: nominal pipe sizes with bore and rated maximum flow.

use std::fmt;
use std::str::FromStr;

use hm_core::units::{Area, Length, VolumeRate, circle_area, m, m3ps};

use crate::error::{MeterError, MeterResult};

/// Nominal gauge (pipe diameter class) of a meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gauge {
    /// 1/2"
    Half,
    /// 3/4"
    ThreeQuarters,
    /// 1"
    One,
    /// 1 1/2"
    OneAndHalf,
    /// 2"
    Two,
    /// 3"
    Three,
    /// 4"
    Four,
}

/// (gauge, key, internal diameter [m], maximum flow [m³/s])
const GAUGE_TABLE: [(Gauge, &str, f64, f64); 7] = [
    (Gauge::Half, "1/2", 0.015, 0.000_694),
    (Gauge::ThreeQuarters, "3/4", 0.020, 0.000_972),
    (Gauge::One, "1", 0.025, 0.001_389),
    (Gauge::OneAndHalf, "1 1/2", 0.040, 0.003_055),
    (Gauge::Two, "2", 0.050, 0.005_555),
    (Gauge::Three, "3", 0.075, 0.012_5),
    (Gauge::Four, "4", 0.100, 0.022_2),
];

impl Gauge {
    /// Every supported gauge, smallest first.
    pub const ALL: [Gauge; 7] = [
        Gauge::Half,
        Gauge::ThreeQuarters,
        Gauge::One,
        Gauge::OneAndHalf,
        Gauge::Two,
        Gauge::Three,
        Gauge::Four,
    ];

    fn row(self) -> (Gauge, &'static str, f64, f64) {
        GAUGE_TABLE[self as usize]
    }

    /// Textual size key in inches, as written in configuration (`"1/2"`).
    pub fn key(self) -> &'static str {
        self.row().1
    }

    /// Physical constants for this gauge.
    pub fn spec(self) -> GaugeSpec {
        let (gauge, _, diameter_m, qmax) = self.row();
        GaugeSpec {
            gauge,
            internal_diameter: m(diameter_m),
            max_flow: m3ps(qmax),
        }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\"", self.key())
    }
}

impl FromStr for Gauge {
    type Err = MeterError;

    /// Accepts the table key, optionally followed by an inch mark (`1/2"`).
    fn from_str(key: &str) -> MeterResult<Self> {
        let normalized = key.trim().trim_end_matches('"').trim();
        Gauge::ALL
            .into_iter()
            .find(|g| g.key() == normalized)
            .ok_or_else(|| MeterError::UnsupportedGauge {
                key: key.to_string(),
            })
    }
}

/// Immutable physical constants of one gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSpec {
    pub gauge: Gauge,
    /// Internal bore diameter
    pub internal_diameter: Length,
    /// Rated maximum flow (Qmax)
    pub max_flow: VolumeRate,
}

impl GaugeSpec {
    /// Look up a gauge by its textual size key.
    pub fn lookup(key: &str) -> MeterResult<Self> {
        key.parse::<Gauge>().map(Gauge::spec)
    }

    /// Textual size key.
    pub fn key(&self) -> &'static str {
        self.gauge.key()
    }

    /// Cross-section of the bore.
    pub fn bore_area(&self) -> Area {
        circle_area(self.internal_diameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_enum() {
        for (i, gauge) in Gauge::ALL.into_iter().enumerate() {
            assert_eq!(GAUGE_TABLE[i].0, gauge);
        }
    }

    #[test]
    fn lookup_returns_documented_constants() {
        let expected = [
            ("1/2", 0.015, 0.000_694),
            ("3/4", 0.020, 0.000_972),
            ("1", 0.025, 0.001_389),
            ("1 1/2", 0.040, 0.003_055),
            ("2", 0.050, 0.005_555),
            ("3", 0.075, 0.012_5),
            ("4", 0.100, 0.022_2),
        ];
        for (key, diameter, qmax) in expected {
            let spec = GaugeSpec::lookup(key).unwrap();
            assert_eq!(spec.key(), key);
            assert_eq!(spec.internal_diameter.value, diameter);
            assert_eq!(spec.max_flow.value, qmax);
        }
    }

    #[test]
    fn lookup_accepts_inch_mark_and_whitespace() {
        assert_eq!(GaugeSpec::lookup(" 3/4\" ").unwrap().gauge, Gauge::ThreeQuarters);
    }

    #[test]
    fn lookup_rejects_unknown_keys() {
        for key in ["", "5/8", "1.5", "half", "1  1/2", "6"] {
            let err = GaugeSpec::lookup(key).unwrap_err();
            assert_eq!(
                err,
                MeterError::UnsupportedGauge {
                    key: key.to_string()
                }
            );
        }
    }

    #[test]
    fn display_uses_inch_mark() {
        assert_eq!(Gauge::OneAndHalf.to_string(), "1 1/2\"");
    }

    #[test]
    fn bore_area_of_half_inch() {
        let area = Gauge::Half.spec().bore_area();
        let expected = std::f64::consts::PI * 0.0075_f64 * 0.0075;
        assert!((area.value - expected).abs() < 1e-15);
    }
}
