//! Snapshot persistence off the driving thread.
//!
//! Each time the whole-m³ count increases a [`SnapshotRecord`] is queued to a
//! dedicated worker, which writes `Medicoes_<matricula>/NN.json` with
//! `NN = m³ mod 100`. On finish the queue is closed and the worker joined, so
//! every submitted snapshot is written, in submission order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use hm_core::units::{in_bar, in_liters};
use hm_sim::{MeterObserver, MeterSnapshot};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::readout::GaugeReadout;

/// One persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRecord {
    pub meter_id: String,
    pub gauge: String,
    pub whole_m3: u64,
    pub volume_m3: f64,
    pub volume_liters: f64,
    pub pressure_bar: f64,
    pub flow_m3ps: f64,
    pub elapsed_s: u64,
    pub tick: u64,
    pub readout: String,
    /// RFC 3339 wall-clock time the snapshot was taken
    pub timestamp: String,
}

impl SnapshotRecord {
    pub fn new(meter_id: &str, snapshot: &MeterSnapshot) -> Self {
        Self {
            meter_id: meter_id.to_string(),
            gauge: snapshot.gauge.key().to_string(),
            whole_m3: GaugeReadout::whole_m3(snapshot.volume),
            volume_m3: snapshot.volume.value,
            volume_liters: in_liters(snapshot.volume),
            pressure_bar: in_bar(snapshot.pressure),
            flow_m3ps: snapshot.flow.value,
            elapsed_s: snapshot.elapsed_s,
            tick: snapshot.tick,
            readout: GaugeReadout::from_volume(snapshot.volume).to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// File name inside the meter folder: two digits, `m³ mod 100`.
    pub fn file_name(&self) -> String {
        format!("{:02}.json", self.whole_m3 % 100)
    }
}

/// Counters shared between the observer, its worker and the caller.
#[derive(Debug, Default)]
pub struct PersistenceStats {
    submitted: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

impl PersistenceStats {
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Acquire)
    }
}

/// Folder that receives the snapshots of `meter_id` under `root`.
pub fn meter_dir(root: &Path, meter_id: &str) -> PathBuf {
    let safe: String = meter_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    root.join(format!("Medicoes_{safe}"))
}

fn write_record(dir: &Path, record: &SnapshotRecord) -> AppResult<PathBuf> {
    let path = dir.join(record.file_name());
    let json = serde_json::to_string_pretty(record)?;
    fs::create_dir_all(dir).map_err(|source| AppError::SnapshotWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| AppError::SnapshotWrite {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Observer that hands whole-m³ crossings to a persistence worker.
pub struct SnapshotPersistence {
    meter_id: Option<String>,
    tx: Option<Sender<SnapshotRecord>>,
    worker: Option<JoinHandle<()>>,
    last_whole_m3: u64,
    stats: Arc<PersistenceStats>,
}

impl SnapshotPersistence {
    /// Start the worker writing under `root`. Without a meter id nothing is
    /// persisted and no worker is spawned.
    pub fn new(root: &Path, meter_id: Option<&str>) -> AppResult<Self> {
        let stats = Arc::new(PersistenceStats::default());
        let Some(id) = meter_id else {
            warn!("no matricula configured; snapshots will not be saved");
            return Ok(Self {
                meter_id: None,
                tx: None,
                worker: None,
                last_whole_m3: 0,
                stats,
            });
        };

        let dir = meter_dir(root, id);
        let (tx, rx) = unbounded::<SnapshotRecord>();
        let worker_stats = stats.clone();
        let worker = thread::Builder::new()
            .name("hm-persistence".to_string())
            .spawn(move || {
                while let Ok(record) = rx.recv() {
                    match write_record(&dir, &record) {
                        Ok(path) => {
                            worker_stats.written.fetch_add(1, Ordering::AcqRel);
                            debug!(path = %path.display(), "snapshot saved");
                        }
                        Err(e) => {
                            worker_stats.failed.fetch_add(1, Ordering::AcqRel);
                            warn!(error = %e, "snapshot not saved");
                        }
                    }
                }
            })?;

        Ok(Self {
            meter_id: Some(id.to_string()),
            tx: Some(tx),
            worker: Some(worker),
            last_whole_m3: 0,
            stats,
        })
    }

    /// Shared counters; stay readable after the observer is handed to an engine.
    pub fn stats(&self) -> Arc<PersistenceStats> {
        self.stats.clone()
    }

    fn submit(&mut self, snapshot: &MeterSnapshot) {
        let (Some(id), Some(tx)) = (self.meter_id.as_deref(), self.tx.as_ref()) else {
            return;
        };
        let record = SnapshotRecord::new(id, snapshot);
        if tx.send(record).is_ok() {
            self.stats.submitted.fetch_add(1, Ordering::AcqRel);
        } else {
            warn!("persistence worker gone; snapshot dropped");
        }
    }

    /// Close the queue and wait for every submitted snapshot to be written.
    fn drain(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("persistence worker panicked");
            }
            info!(
                written = self.stats.written(),
                failed = self.stats.failed(),
                "snapshot persistence drained"
            );
        }
    }
}

impl MeterObserver for SnapshotPersistence {
    fn on_tick(&mut self, snapshot: &MeterSnapshot, _elapsed_s: u64) {
        let whole = GaugeReadout::whole_m3(snapshot.volume);
        if whole > self.last_whole_m3 {
            self.last_whole_m3 = whole;
            self.submit(snapshot);
        }
    }

    fn on_finished(&mut self, _snapshot: &MeterSnapshot) {
        self.drain();
    }
}

impl Drop for SnapshotPersistence {
    fn drop(&mut self) {
        self.drain();
    }
}
