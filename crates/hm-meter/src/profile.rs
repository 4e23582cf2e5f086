//! Time-of-day consumption profiles.
//!
//! A profile associates an inclusive hour band with a flow-speed range. An
//! ordered [`ProfileSet`] covers the day; for each hour the first profile in
//! declaration order whose band contains it is the active one.

use hm_core::numeric::{ensure_non_negative, ensure_range};
use hm_core::units::{Velocity, mps};
use rand::Rng;
use tracing::warn;

use crate::error::{MeterError, MeterResult};
use crate::sampler::draw_uniform;

pub const HOURS_PER_DAY: u32 = 24;
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Hour of the (repeating) simulated day for a simulated second.
pub fn hour_of_day(simulated_second: u64) -> u32 {
    ((simulated_second / SECONDS_PER_HOUR) % u64::from(HOURS_PER_DAY)) as u32
}

/// A time-of-day band with its flow-speed range.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionProfile {
    pub name: String,
    pub speed_min: Velocity,
    pub speed_max: Velocity,
    /// First active hour (inclusive, 0-23)
    pub hour_start: u32,
    /// Last active hour (inclusive, 0-23)
    pub hour_end: u32,
}

impl ConsumptionProfile {
    /// Create a profile from speeds in m/s. Not validated; see [`Self::validate`].
    pub fn new(
        name: impl Into<String>,
        speed_min_mps: f64,
        speed_max_mps: f64,
        hour_start: u32,
        hour_end: u32,
    ) -> Self {
        Self {
            name: name.into(),
            speed_min: mps(speed_min_mps),
            speed_max: mps(speed_max_mps),
            hour_start,
            hour_end,
        }
    }

    /// True when `hour` falls inside `[hour_start, hour_end]`.
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.hour_start && hour <= self.hour_end
    }

    /// Draw a base speed uniformly from `[speed_min, speed_max]`.
    pub fn draw_speed<R: Rng + ?Sized>(&self, rng: &mut R) -> Velocity {
        mps(draw_uniform(rng, self.speed_min.value, self.speed_max.value))
    }

    pub fn validate(&self) -> MeterResult<()> {
        let invalid = |what| MeterError::InvalidProfile {
            name: self.name.clone(),
            what,
        };
        ensure_range(self.speed_min.value, self.speed_max.value, "profile speed")
            .map_err(|_| invalid("speed_min must not exceed speed_max"))?;
        ensure_non_negative(self.speed_min.value, "profile speed")
            .map_err(|_| invalid("speeds must be non-negative"))?;
        if self.hour_start >= HOURS_PER_DAY || self.hour_end >= HOURS_PER_DAY {
            return Err(invalid("hours must be within 0-23"));
        }
        if self.hour_start > self.hour_end {
            return Err(invalid("hour_start must not exceed hour_end"));
        }
        Ok(())
    }
}

/// First profile in `profiles` whose band contains `hour`.
pub fn active_profile(
    hour: u32,
    profiles: &[ConsumptionProfile],
) -> MeterResult<&ConsumptionProfile> {
    profiles
        .iter()
        .find(|p| p.contains(hour))
        .ok_or(MeterError::NoActiveProfile { hour })
}

/// Ordered collection of profiles covering the day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSet {
    profiles: Vec<ConsumptionProfile>,
}

impl ProfileSet {
    /// Wrap profiles in evaluation order without validating them.
    pub fn new(profiles: Vec<ConsumptionProfile>) -> Self {
        Self { profiles }
    }

    /// Wrap and validate: every profile well formed, all 24 hours covered.
    pub fn validated(profiles: Vec<ConsumptionProfile>) -> MeterResult<Self> {
        let set = Self::new(profiles);
        set.validate()?;
        Ok(set)
    }

    /// Built-in residential day: quiet overnight, morning and evening peaks.
    pub fn standard_day() -> Self {
        Self::new(vec![
            ConsumptionProfile::new("madrugada", 0.01, 0.2, 0, 5),
            ConsumptionProfile::new("manha", 1.5, 2.8, 6, 9),
            ConsumptionProfile::new("tarde", 0.5, 1.5, 10, 17),
            ConsumptionProfile::new("noite", 1.2, 2.5, 18, 23),
        ])
    }

    pub fn active_profile(&self, hour: u32) -> MeterResult<&ConsumptionProfile> {
        active_profile(hour, &self.profiles)
    }

    /// Active profile for `hour` together with its position in the set.
    pub fn active_entry(&self, hour: u32) -> MeterResult<(usize, &ConsumptionProfile)> {
        self.profiles
            .iter()
            .enumerate()
            .find(|(_, p)| p.contains(hour))
            .ok_or(MeterError::NoActiveProfile { hour })
    }

    /// Index of the active profile for `hour`, if any.
    pub fn active_index(&self, hour: u32) -> Option<usize> {
        self.profiles.iter().position(|p| p.contains(hour))
    }

    /// Hours no profile claims.
    pub fn coverage_gaps(&self) -> Vec<u32> {
        (0..HOURS_PER_DAY)
            .filter(|&h| self.active_index(h).is_none())
            .collect()
    }

    /// Hours claimed by more than one profile (the first one wins).
    pub fn overlapping_hours(&self) -> Vec<u32> {
        (0..HOURS_PER_DAY)
            .filter(|&h| self.profiles.iter().filter(|p| p.contains(h)).count() > 1)
            .collect()
    }

    pub fn validate(&self) -> MeterResult<()> {
        for profile in &self.profiles {
            profile.validate()?;
        }
        if let Some(&hour) = self.coverage_gaps().first() {
            return Err(MeterError::NoActiveProfile { hour });
        }
        let overlaps = self.overlapping_hours();
        if !overlaps.is_empty() {
            warn!(hours = ?overlaps, "consumption profiles overlap; first declared profile wins");
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&ConsumptionProfile> {
        self.profiles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsumptionProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
