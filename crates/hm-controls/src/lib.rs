//! Operator control domain for the hydrometer simulator.
//!
//! The simulation reads a single operator-controlled value: the flow
//! multiplier, which models a user opening or closing a tap. It is the only
//! state shared between the driving loop and an external control surface
//! (slider, stdin reader, test harness).
//!
//! # Architecture
//!
//! - [`FlowController`] stores the multiplier lock-free; readers never observe
//!   a torn value and out-of-range writes are clamped rather than rejected.
//! - [`FlowCommand`] is the textual command language a control surface speaks
//!   (absolute percentage, relative change, stop request).

pub mod command;
pub mod error;
pub mod flow;

pub use command::FlowCommand;
pub use error::{ControlError, ControlResult};
pub use flow::{FlowController, clamp_percent};
