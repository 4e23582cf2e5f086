//! Error types for control surface operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while interpreting operator input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Nothing to interpret.
    #[error("Empty command")]
    EmptyCommand,

    /// Input is not a recognised command or percentage.
    #[error("Invalid command: {input}")]
    InvalidCommand { input: String },
}
