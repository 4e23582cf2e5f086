//! Resolved simulator configuration.

use hm_core::units::bar;
use hm_meter::{ConsumptionProfile, Gauge, GaugeSpec, ProfileSet, SamplerConfig, TrickleRange};
use serde::{Serialize, Serializer};

/// Profile band names in evaluation order.
pub const PROFILE_NAMES: [&str; 4] = ["madrugada", "manha", "tarde", "noite"];

pub const DEFAULT_TIME_SCALE_S: u64 = 1;
pub const DEFAULT_AIR_SPEED_MIN: f64 = 0.001;
pub const DEFAULT_AIR_SPEED_MAX: f64 = 0.005;

/// One time band of the consumption day, in plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDef {
    pub name: String,
    /// m/s
    pub speed_min: f64,
    /// m/s
    pub speed_max: f64,
    pub hour_start: u32,
    pub hour_end: u32,
}

impl ProfileDef {
    pub fn to_profile(&self) -> ConsumptionProfile {
        ConsumptionProfile::new(
            self.name.clone(),
            self.speed_min,
            self.speed_max,
            self.hour_start,
            self.hour_end,
        )
    }
}

/// Built-in day, used for every profile key the file leaves out.
pub fn default_profiles() -> Vec<ProfileDef> {
    ProfileSet::standard_day()
        .iter()
        .map(|p| ProfileDef {
            name: p.name.clone(),
            speed_min: p.speed_min.value,
            speed_max: p.speed_max.value,
            hour_start: p.hour_start,
            hour_end: p.hour_end,
        })
        .collect()
}

fn serialize_gauge<S: Serializer>(gauge: &Gauge, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(gauge.key())
}

/// Everything read from a configuration file, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatorConfig {
    #[serde(rename = "bitola", serialize_with = "serialize_gauge")]
    pub gauge: Gauge,
    /// Total simulated seconds, `-1` for an unbounded run
    #[serde(rename = "tempoExecucao")]
    pub run_duration_s: i64,
    /// Wall-clock seconds between ticks
    #[serde(rename = "intervaloAtualizacao")]
    pub update_interval_s: u64,
    /// Simulated seconds per tick
    #[serde(rename = "escalaDeTempo")]
    pub time_scale_s: u64,
    #[serde(rename = "pressaoMinima")]
    pub pressure_min_bar: f64,
    #[serde(rename = "pressaoMaxima")]
    pub pressure_max_bar: f64,
    #[serde(rename = "simularAr")]
    pub simulate_air: bool,
    #[serde(rename = "ar_vel_min")]
    pub air_speed_min: f64,
    #[serde(rename = "ar_vel_max")]
    pub air_speed_max: f64,
    /// Meter registration id used to name snapshot folders
    #[serde(rename = "matricula")]
    pub meter_id: Option<String>,
    pub profiles: Vec<ProfileDef>,
}

impl SimulatorConfig {
    /// Config with the required values and every default.
    pub fn new(gauge: Gauge, run_duration_s: i64, update_interval_s: u64) -> Self {
        Self {
            gauge,
            run_duration_s,
            update_interval_s,
            time_scale_s: DEFAULT_TIME_SCALE_S,
            pressure_min_bar: 0.0,
            pressure_max_bar: 0.0,
            simulate_air: false,
            air_speed_min: DEFAULT_AIR_SPEED_MIN,
            air_speed_max: DEFAULT_AIR_SPEED_MAX,
            meter_id: None,
            profiles: default_profiles(),
        }
    }

    pub fn gauge_spec(&self) -> GaugeSpec {
        self.gauge.spec()
    }

    pub fn profile_set(&self) -> ProfileSet {
        ProfileSet::new(self.profiles.iter().map(ProfileDef::to_profile).collect())
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            pressure_min: bar(self.pressure_min_bar),
            pressure_max: bar(self.pressure_max_bar),
            air: self
                .simulate_air
                .then(|| TrickleRange::new(self.air_speed_min, self.air_speed_max)),
        }
    }

    pub fn profile_mut(&mut self, name: &str) -> Option<&mut ProfileDef> {
        self.profiles.iter_mut().find(|p| p.name == name)
    }
}
