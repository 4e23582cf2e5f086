//! hm-project: simulator configuration file format and validation.
//!
//! The configuration is a flat `key=value` text file. Profile keys use the
//! band names `madrugada`, `manha`, `tarde` and `noite` as prefixes.

pub mod parse;
pub mod schema;
pub mod validate;

pub use parse::parse_str;
pub use schema::*;
pub use validate::validate_config;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing required key: {key}")]
    MissingKey { key: &'static str },

    #[error("Malformed value for {key}: {value:?} ({reason})")]
    Malformed {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Meter model error: {0}")]
    Meter(#[from] hm_meter::MeterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read, parse and validate a configuration file.
pub fn load_file(path: &std::path::Path) -> ConfigResult<SimulatorConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_str(&content)?;
    validate_config(&config)?;
    tracing::info!(path = %path.display(), gauge = %config.gauge, "configuration loaded");
    Ok(config)
}

/// Resolved configuration as pretty-printed JSON.
pub fn to_json_pretty(config: &SimulatorConfig) -> ConfigResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
