//! Application layer for the water meter simulator.
//!
//! Wires configuration, engine and observers together for the CLI:
//! console measurement log, snapshot persistence on a worker thread,
//! gauge readout decomposition and the interactive flow control surface.

pub mod console;
pub mod control;
pub mod error;
pub mod persistence;
pub mod readout;
pub mod run_service;

pub use console::ConsoleLogger;
pub use control::{ControlOutcome, handle_line, spawn_control};
pub use error::{AppError, AppResult};
pub use persistence::{PersistenceStats, SnapshotPersistence, SnapshotRecord};
pub use readout::GaugeReadout;
pub use run_service::{RunOverrides, RunResponse, build_engine, engine_config, run, run_with_config};
