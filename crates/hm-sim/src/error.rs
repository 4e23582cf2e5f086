//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while driving a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid engine state: {what}")]
    InvalidState { what: &'static str },

    #[error("Meter model error: {0}")]
    Meter(hm_meter::MeterError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hm_meter::MeterError> for SimError {
    fn from(e: hm_meter::MeterError) -> Self {
        SimError::Meter(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hm_meter::MeterError;

    #[test]
    fn meter_errors_keep_their_identity() {
        let err: SimError = MeterError::NoActiveProfile { hour: 7 }.into();
        assert_eq!(err, SimError::Meter(MeterError::NoActiveProfile { hour: 7 }));
        assert!(err.to_string().contains("hour 7"));
    }
}
