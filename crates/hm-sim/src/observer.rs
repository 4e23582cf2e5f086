//! Observer contract and read-only state snapshots.

use std::sync::{Arc, Mutex, PoisonError};

use hm_core::units::{Pressure, Volume, VolumeRate};
use hm_meter::{GaugeSpec, Meter};

/// Read-only view of the meter handed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSnapshot {
    pub gauge: GaugeSpec,
    /// Accumulated volume since t=0
    pub volume: Volume,
    /// Pressure of the most recent sample
    pub pressure: Pressure,
    /// Flow of the most recent sample
    pub flow: VolumeRate,
    /// Simulated seconds since t=0
    pub elapsed_s: u64,
    /// Completed advances
    pub tick: u64,
}

impl MeterSnapshot {
    pub fn of(meter: &Meter, elapsed_s: u64, tick: u64) -> Self {
        Self {
            gauge: *meter.gauge(),
            volume: meter.volume(),
            pressure: meter.pressure(),
            flow: meter.last_flow(),
            elapsed_s,
            tick,
        }
    }
}

/// Receives meter updates from a [`crate::SimulationEngine`].
///
/// Observers are called synchronously, in registration order, on the thread
/// driving the engine. Slow work (disk, network) belongs on a worker.
pub trait MeterObserver: Send {
    /// Called after initialization and after every advance.
    fn on_tick(&mut self, snapshot: &MeterSnapshot, elapsed_s: u64);

    /// Called exactly once when the run ends.
    fn on_finished(&mut self, snapshot: &MeterSnapshot);
}

/// Snapshots collected by a [`SnapshotRecorder`].
#[derive(Debug, Clone, Default)]
pub struct SimRecord {
    /// Every tick snapshot, in notification order
    pub ticks: Vec<MeterSnapshot>,
    /// Final snapshot, set once on finish
    pub finished: Option<MeterSnapshot>,
}

impl SimRecord {
    pub fn last(&self) -> Option<&MeterSnapshot> {
        self.finished.as_ref().or(self.ticks.last())
    }
}

/// Observer that keeps every snapshot in memory behind a shared handle.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    record: Arc<Mutex<SimRecord>>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn record(&self) -> SimRecord {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MeterObserver for SnapshotRecorder {
    fn on_tick(&mut self, snapshot: &MeterSnapshot, _elapsed_s: u64) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ticks
            .push(*snapshot);
    }

    fn on_finished(&mut self, snapshot: &MeterSnapshot) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finished = Some(*snapshot);
    }
}
