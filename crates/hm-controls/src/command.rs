//! Textual commands accepted from a control surface.

use std::str::FromStr;

use crate::error::{ControlError, ControlResult};
use crate::flow::FlowController;

/// One operator instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowCommand {
    /// Absolute percentage, e.g. `75` or `75%`.
    SetPercent(f64),
    /// Relative change, e.g. `+10` or `-5%`.
    Adjust(f64),
    /// Request a graceful stop of the run (`q`, `quit`, `stop`, `exit`).
    Stop,
}

impl FlowCommand {
    /// Apply the command to `controller`.
    ///
    /// Returns the stored percentage, or `None` for [`FlowCommand::Stop`],
    /// which the caller routes to the driving loop instead.
    pub fn apply(&self, controller: &FlowController) -> Option<f64> {
        match *self {
            Self::SetPercent(p) => Some(controller.set_percent(p)),
            Self::Adjust(delta) => Some(controller.adjust_percent(delta)),
            Self::Stop => None,
        }
    }
}

/// Value after an explicit `+`/`-`; a second sign is rejected.
fn parse_magnitude(raw: &str, input: &str) -> ControlResult<f64> {
    if raw.trim_start().starts_with(['+', '-']) {
        return Err(ControlError::InvalidCommand {
            input: input.to_string(),
        });
    }
    parse_number(raw, input)
}

fn parse_number(raw: &str, input: &str) -> ControlResult<f64> {
    let digits = raw.trim().trim_end_matches('%').trim();
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ControlError::InvalidCommand {
            input: input.to_string(),
        }),
    }
}

impl FromStr for FlowCommand {
    type Err = ControlError;

    fn from_str(input: &str) -> ControlResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ControlError::EmptyCommand);
        }

        if matches!(
            trimmed.to_ascii_lowercase().as_str(),
            "q" | "quit" | "stop" | "exit"
        ) {
            return Ok(Self::Stop);
        }

        if let Some(rest) = trimmed.strip_prefix('+') {
            return parse_magnitude(rest, input).map(Self::Adjust);
        }
        if let Some(rest) = trimmed.strip_prefix('-') {
            return parse_magnitude(rest, input).map(|v| Self::Adjust(-v));
        }
        parse_number(trimmed, input).map(Self::SetPercent)
    }
}
