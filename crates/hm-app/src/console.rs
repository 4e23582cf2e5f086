//! Human-readable measurement log written by an observer.

use std::io::Write;

use hm_core::units::{in_bar, in_liters, in_mm};
use hm_sim::{MeterObserver, MeterSnapshot, RunDuration};
use tracing::warn;

use crate::readout::GaugeReadout;

/// Writes one block per tick and a closing line when the run ends.
pub struct ConsoleLogger<W: Write + Send> {
    out: W,
    update_interval_s: u64,
    run_duration: RunDuration,
}

impl<W: Write + Send> ConsoleLogger<W> {
    pub fn new(out: W, update_interval_s: u64, run_duration: RunDuration) -> Self {
        Self {
            out,
            update_interval_s,
            run_duration,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_tick(&mut self, snapshot: &MeterSnapshot, elapsed_s: u64) -> std::io::Result<()> {
        let duration = match self.run_duration {
            RunDuration::Bounded(s) => format!("{s}s"),
            RunDuration::Unbounded => "unbounded".to_string(),
        };
        writeln!(self.out, "----------------------------------------")?;
        writeln!(self.out, "Time: {elapsed_s}s (tick {})", snapshot.tick)?;
        writeln!(self.out, "Volume: {:.3} L", in_liters(snapshot.volume))?;
        writeln!(self.out, "Pressure: {:.2} bar", in_bar(snapshot.pressure))?;
        writeln!(self.out, "Flow: {:.6} L/s", snapshot.flow.value * 1_000.0)?;
        writeln!(
            self.out,
            "Gauge: {:.0} mm ({})",
            in_mm(snapshot.gauge.internal_diameter),
            snapshot.gauge.gauge
        )?;
        writeln!(self.out, "Readout: {}", GaugeReadout::from_volume(snapshot.volume))?;
        writeln!(self.out, "Update interval: {}s", self.update_interval_s)?;
        writeln!(self.out, "Run duration: {duration}")?;
        self.out.flush()
    }
}

impl<W: Write + Send> MeterObserver for ConsoleLogger<W> {
    fn on_tick(&mut self, snapshot: &MeterSnapshot, elapsed_s: u64) {
        if let Err(e) = self.write_tick(snapshot, elapsed_s) {
            warn!(error = %e, "console log write failed");
        }
    }

    fn on_finished(&mut self, snapshot: &MeterSnapshot) {
        let result = writeln!(
            self.out,
            "Simulation finished. Total volume: {:.6} m³",
            snapshot.volume.value
        )
        .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "console log write failed");
        }
    }
}
