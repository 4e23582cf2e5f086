//! Decomposition of an accumulated volume into what the dial face shows.
//!
//! The face has four black odometer digits (whole m³), two red digits
//! (hundreds and tens of litres) and two pointer dials (litres and tenths
//! of a litre). Each dial step is 36°.

use std::fmt;

use hm_core::units::Volume;

pub const DEGREES_PER_DIAL_STEP: f64 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeReadout {
    /// Whole cubic metres, modulo 10 000
    pub odometer: u32,
    /// Hundreds and tens of litres
    pub red_digits: [u8; 2],
    /// Litres dial value (0-9)
    pub liters_dial: u8,
    /// Tenths-of-litre dial value (0-9)
    pub tenths_dial: u8,
}

fn digit(volume_m3: f64, scale: f64) -> u8 {
    ((volume_m3 * scale).floor() as u64 % 10) as u8
}

impl GaugeReadout {
    pub fn from_volume(volume: Volume) -> Self {
        let v = volume.value.max(0.0);
        Self {
            odometer: (v.floor() as u64 % 10_000) as u32,
            red_digits: [digit(v, 10.0), digit(v, 100.0)],
            liters_dial: digit(v, 1_000.0),
            tenths_dial: digit(v, 10_000.0),
        }
    }

    /// Whole cubic metres (the black digits as a number).
    pub fn whole_m3(volume: Volume) -> u64 {
        volume.value.max(0.0).floor() as u64
    }

    pub fn liters_angle_deg(&self) -> f64 {
        f64::from(self.liters_dial) * DEGREES_PER_DIAL_STEP
    }

    pub fn tenths_angle_deg(&self) -> f64 {
        f64::from(self.tenths_dial) * DEGREES_PER_DIAL_STEP
    }
}

impl fmt::Display for GaugeReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}|{}{} L:{} 0.1L:{}",
            self.odometer, self.red_digits[0], self.red_digits[1], self.liters_dial, self.tenths_dial
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hm_core::units::m3;

    #[test]
    fn decomposes_an_hour_at_half_inch() {
        let r = GaugeReadout::from_volume(m3(0.318_086));
        assert_eq!(r.odometer, 0);
        assert_eq!(r.red_digits, [3, 1]);
        assert_eq!(r.liters_dial, 8);
        assert_eq!(r.tenths_dial, 0);
        assert_eq!(r.liters_angle_deg(), 288.0);
        assert_eq!(r.to_string(), "0000|31 L:8 0.1L:0");
    }

    #[test]
    fn odometer_rolls_over() {
        let r = GaugeReadout::from_volume(m3(12_345.678_9));
        assert_eq!(r.odometer, 2_345);
        assert_eq!(r.red_digits, [6, 7]);
        assert_eq!(r.liters_dial, 8);
        assert_eq!(GaugeReadout::whole_m3(m3(12_345.678_9)), 12_345);
    }
}
