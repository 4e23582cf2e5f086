//! Error types for the hm-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Meter model error: {0}")]
    Meter(String),

    #[error("Control error: {0}")]
    Control(String),

    #[error("Failed to write snapshot: {path}")]
    SnapshotWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hm-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hm_project::ConfigError> for AppError {
    fn from(err: hm_project::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<hm_sim::SimError> for AppError {
    fn from(err: hm_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<hm_meter::MeterError> for AppError {
    fn from(err: hm_meter::MeterError) -> Self {
        AppError::Meter(err.to_string())
    }
}

impl From<hm_controls::ControlError> for AppError {
    fn from(err: hm_controls::ControlError) -> Self {
        AppError::Control(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
