//! `key=value` configuration parser.
//!
//! Lines are trimmed; blank lines and `#` comments are skipped. A line that
//! does not split into exactly one key and one value is skipped with a
//! warning, as are unknown keys. A repeated key keeps its last value.

use std::str::FromStr;

use hm_meter::Gauge;
use tracing::warn;

use crate::schema::{PROFILE_NAMES, SimulatorConfig};
use crate::{ConfigError, ConfigResult};

fn number<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse::<T>().map_err(|_| ConfigError::Malformed {
        key: key.to_string(),
        value: value.to_string(),
        reason: "not a number of the expected kind",
    })
}

fn real(key: &str, value: &str) -> ConfigResult<f64> {
    let v: f64 = number(key, value)?;
    if !v.is_finite() {
        return Err(ConfigError::Malformed {
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be finite",
        });
    }
    Ok(v)
}

fn boolean(key: &str, value: &str) -> ConfigResult<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::Malformed {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false",
        })
    }
}

/// Split `madrugada_vel_min` into (`madrugada`, `vel_min`).
fn profile_key(key: &str) -> Option<(&'static str, &str)> {
    PROFILE_NAMES.into_iter().find_map(|name| {
        key.strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('_'))
            .map(|suffix| (name, suffix))
    })
}

/// Parse configuration text. Required keys are checked; range and coverage
/// checks are left to [`crate::validate_config`].
pub fn parse_str(content: &str) -> ConfigResult<SimulatorConfig> {
    let mut gauge: Option<Gauge> = None;
    let mut run_duration_s: Option<i64> = None;
    let mut update_interval_s: Option<u64> = None;
    let mut config = SimulatorConfig::new(Gauge::Half, 0, 0);

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('=').collect();
        let [key, value] = parts.as_slice() else {
            warn!(line = index + 1, text = line, "malformed configuration line ignored");
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if let Some((name, suffix)) = profile_key(key) {
            let Some(profile) = config.profile_mut(name) else {
                continue;
            };
            match suffix {
                "vel_min" => profile.speed_min = real(key, value)?,
                "vel_max" => profile.speed_max = real(key, value)?,
                "inicio" => profile.hour_start = number(key, value)?,
                "fim" => profile.hour_end = number(key, value)?,
                _ => warn!(key, "unknown profile key ignored"),
            }
            continue;
        }

        match key {
            "bitola" => gauge = Some(value.parse::<Gauge>()?),
            "tempoExecucao" => run_duration_s = Some(number(key, value)?),
            "intervaloAtualizacao" => update_interval_s = Some(number(key, value)?),
            "escalaDeTempo" => config.time_scale_s = number(key, value)?,
            "pressaoMinima" => config.pressure_min_bar = real(key, value)?,
            "pressaoMaxima" => config.pressure_max_bar = real(key, value)?,
            "simularAr" => config.simulate_air = boolean(key, value)?,
            "ar_vel_min" => config.air_speed_min = real(key, value)?,
            "ar_vel_max" => config.air_speed_max = real(key, value)?,
            "matricula" => {
                config.meter_id = (!value.is_empty()).then(|| value.to_string());
            }
            _ => warn!(key, "unknown configuration key ignored"),
        }
    }

    config.gauge = gauge.ok_or(ConfigError::MissingKey { key: "bitola" })?;
    config.run_duration_s = run_duration_s.ok_or(ConfigError::MissingKey {
        key: "tempoExecucao",
    })?;
    config.update_interval_s = update_interval_s.ok_or(ConfigError::MissingKey {
        key: "intervaloAtualizacao",
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_profiles;
    use hm_meter::MeterError;

    const MINIMAL: &str = "bitola=1/2\ntempoExecucao=3600\nintervaloAtualizacao=1\n";

    #[test]
    fn minimal_file_takes_defaults() {
        let config = parse_str(MINIMAL).unwrap();
        assert_eq!(config.gauge, Gauge::Half);
        assert_eq!(config.run_duration_s, 3_600);
        assert_eq!(config.update_interval_s, 1);
        assert_eq!(config.time_scale_s, 1);
        assert_eq!(config.pressure_min_bar, 0.0);
        assert!(!config.simulate_air);
        assert!(config.meter_id.is_none());
        assert_eq!(config.profiles, default_profiles());
    }

    #[test]
    fn comments_blanks_and_junk_are_skipped() {
        let text = "# header\n\n   \nbitola = 3/4 \nnot a pair\na=b=c\n\
                    tempoExecucao=-1\nintervaloAtualizacao=2\ncolor=blue\n";
        let config = parse_str(text).unwrap();
        assert_eq!(config.gauge, Gauge::ThreeQuarters);
        assert_eq!(config.run_duration_s, -1);
    }

    #[test]
    fn profile_keys_override_single_fields() {
        let text = format!("{MINIMAL}manha_vel_max=3.5\nnoite_inicio=19\nmadrugada_fim=6\n");
        let config = parse_str(&text).unwrap();
        let defaults = default_profiles();
        assert_eq!(config.profiles[1].speed_max, 3.5);
        assert_eq!(config.profiles[1].speed_min, defaults[1].speed_min);
        assert_eq!(config.profiles[3].hour_start, 19);
        assert_eq!(config.profiles[0].hour_end, 6);
    }

    #[test]
    fn optional_keys_are_read() {
        let text = format!(
            "{MINIMAL}escalaDeTempo=3600\npressaoMinima=1.5\npressaoMaxima=4\n\
             simularAr=TRUE\nmatricula=ABC-123\nar_vel_max=0.01\n"
        );
        let config = parse_str(&text).unwrap();
        assert_eq!(config.time_scale_s, 3_600);
        assert_eq!(config.pressure_min_bar, 1.5);
        assert_eq!(config.pressure_max_bar, 4.0);
        assert!(config.simulate_air);
        assert_eq!(config.meter_id.as_deref(), Some("ABC-123"));
        assert_eq!(config.air_speed_max, 0.01);
    }

    #[test]
    fn last_assignment_wins() {
        let text = format!("{MINIMAL}bitola=2\n");
        assert_eq!(parse_str(&text).unwrap().gauge, Gauge::Two);
    }

    #[test]
    fn missing_required_keys() {
        let err = parse_str("tempoExecucao=1\nintervaloAtualizacao=1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "bitola" }));
        let err = parse_str("bitola=1\nintervaloAtualizacao=1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "tempoExecucao" }));
        let err = parse_str("bitola=1\ntempoExecucao=1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingKey {
                key: "intervaloAtualizacao"
            }
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = parse_str("bitola=5/8\ntempoExecucao=1\nintervaloAtualizacao=1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Meter(MeterError::UnsupportedGauge { .. })
        ));

        for bad in [
            "escalaDeTempo=-5",
            "pressaoMinima=high",
            "simularAr=yes",
            "tarde_inicio=ten",
            "manha_vel_min=NaN",
        ] {
            let err = parse_str(&format!("{MINIMAL}{bad}\n")).unwrap_err();
            assert!(matches!(err, ConfigError::Malformed { .. }), "{bad}: {err}");
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn padding_and_comments_do_not_change_the_result(
            pad in "[ \t]{0,4}",
            comment in "#[a-z =]{0,12}",
            duration in -1_i64..1_000_000,
        ) {
            let text = format!(
                "{comment}\n{pad}bitola{pad}={pad}2{pad}\n\n\
                 {pad}tempoExecucao={pad}{duration}\nintervaloAtualizacao=3{pad}\n"
            );
            let config = parse_str(&text).unwrap();
            prop_assert_eq!(config.gauge, Gauge::Two);
            prop_assert_eq!(config.run_duration_s, duration);
            prop_assert_eq!(config.update_interval_s, 3);
        }
    }
}
