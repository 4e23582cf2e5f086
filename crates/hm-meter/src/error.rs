//! Error types for meter model operations.

use hm_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building or sampling the meter model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeterError {
    #[error("Unsupported gauge: {key:?}")]
    UnsupportedGauge { key: String },

    #[error("No consumption profile active at hour {hour}")]
    NoActiveProfile { hour: u32 },

    #[error("Invalid profile '{name}': {what}")]
    InvalidProfile { name: String, what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numeric error: {0}")]
    Numeric(#[from] CoreError),
}

pub type MeterResult<T> = Result<T, MeterError>;
