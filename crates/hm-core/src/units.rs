// hm-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, Pressure as UomPressure, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// Pressure expressed in bar.
#[inline]
pub fn in_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

/// Volume expressed in litres.
#[inline]
pub fn in_liters(v: Volume) -> f64 {
    use uom::si::volume::liter;
    v.get::<liter>()
}

/// Length expressed in millimetres.
#[inline]
pub fn in_mm(l: Length) -> f64 {
    use uom::si::length::millimeter;
    l.get::<millimeter>()
}

/// Cross-section of a circular bore.
#[inline]
pub fn circle_area(diameter: Length) -> Area {
    let radius = diameter / 2.0;
    radius * radius * std::f64::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(0.015);
        let _v = mps(0.5);
        let _vol = m3(1.0);
        let _q = m3ps(0.000_694);
        let _p = bar(2.5);
        let _dt = s(3600.0);
    }

    #[test]
    fn unit_conversions() {
        assert!((in_bar(bar(2.5)) - 2.5).abs() < 1e-12);
        assert!((bar(1.0).value - 100_000.0).abs() < 1e-9);
        assert!((in_liters(m3(0.318)) - 318.0).abs() < 1e-9);
        assert!((in_mm(m(0.015)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn area_times_velocity_is_volume_rate() {
        let area = circle_area(m(0.015));
        let q: VolumeRate = area * mps(0.5);
        let expected = std::f64::consts::PI * 0.0075_f64.powi(2) * 0.5;
        assert!((q.value - expected).abs() < 1e-15);

        let v: Volume = q * s(3600.0);
        assert!((v.value - expected * 3600.0).abs() < 1e-12);
    }
}
