//! Time-stepped simulation of a water meter.
//!
//! Provides:
//! - `SimulationEngine`: advances simulated time, samples, accumulates and
//!   notifies observers (`NotStarted -> Running -> Finished`)
//! - Observer contract (`MeterObserver`) with read-only `MeterSnapshot`s
//! - Driving loop with real-time pacing and graceful stop

pub mod driver;
pub mod engine;
pub mod error;
pub mod observer;

// Re-exports for public API
pub use driver::{RunOptions, RunSummary, StopHandle, StopReason, StopSignal, run_loop, stop_channel};
pub use engine::{EngineConfig, EnginePhase, RunDuration, SimulationEngine};
pub use error::{SimError, SimResult};
pub use observer::{MeterObserver, MeterSnapshot, SimRecord, SnapshotRecorder};
