//! Configuration validation, run before an engine is built.

use crate::schema::SimulatorConfig;
use crate::{ConfigError, ConfigResult};

pub fn validate_config(config: &SimulatorConfig) -> ConfigResult<()> {
    if config.time_scale_s == 0 {
        return Err(ConfigError::InvalidValue {
            field: "escalaDeTempo",
            value: config.time_scale_s.to_string(),
            reason: "must be at least one second",
        });
    }
    if config.run_duration_s < -1 {
        return Err(ConfigError::InvalidValue {
            field: "tempoExecucao",
            value: config.run_duration_s.to_string(),
            reason: "must be -1 (unbounded) or non-negative",
        });
    }
    if config.pressure_min_bar > config.pressure_max_bar {
        return Err(ConfigError::InvalidValue {
            field: "pressaoMinima",
            value: config.pressure_min_bar.to_string(),
            reason: "must not exceed pressaoMaxima",
        });
    }
    if config.simulate_air
        && (config.air_speed_min < 0.0 || config.air_speed_min > config.air_speed_max)
    {
        return Err(ConfigError::InvalidValue {
            field: "ar_vel_min",
            value: config.air_speed_min.to_string(),
            reason: "trickle range must satisfy 0 <= ar_vel_min <= ar_vel_max",
        });
    }

    config.profile_set().validate()?;
    config.sampler_config().validate()?;
    Ok(())
}
