//! Real-time driving loop with graceful stop.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use hm_core::units::{Volume, m3};
use tracing::{info, warn};

use crate::engine::{EnginePhase, SimulationEngine};
use crate::error::SimResult;

/// Options for [`run_loop`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Wall-clock wait between advances
    pub pacing: Duration,
    /// Stop after this many advances even if the run is unbounded
    pub max_ticks: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::from_secs(1),
            max_ticks: None,
        }
    }
}

/// Why [`run_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured run duration elapsed.
    Completed,
    /// A stop was requested through a [`StopHandle`].
    Interrupted,
    /// `max_ticks` advances were made.
    TickLimit,
}

/// Outcome of a driven run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_s: u64,
    pub final_volume: Volume,
    pub reason: StopReason,
}

/// Requests a graceful stop. Cheap to clone; any clone may stop the run.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        // A full slot means a stop is already pending.
        let _ = self.tx.try_send(());
    }
}

/// Receiving side of a stop channel, polled by the driving loop.
#[derive(Debug)]
pub struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    /// True if a stop is pending. Consumes the request.
    pub fn is_requested(&self) -> bool {
        matches!(self.rx.try_recv(), Ok(()))
    }

    /// Sleep up to `timeout`, waking early on a stop request.
    ///
    /// Dropping every [`StopHandle`] does not stop the run; the wait then
    /// degrades to a plain sleep.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                false
            }
        }
    }
}

/// Create a connected stop handle/signal pair.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = bounded(1);
    (StopHandle { tx }, StopSignal { rx })
}

/// Drive `engine` until its duration elapses, a stop is requested or the
/// tick limit is hit. Observers always receive the finish notification, also
/// when an advance fails.
pub fn run_loop(
    engine: &mut SimulationEngine,
    options: &RunOptions,
    stop: &StopSignal,
) -> SimResult<RunSummary> {
    if engine.phase() == EnginePhase::NotStarted {
        engine.initialize()?;
    }
    if engine.phase() == EnginePhase::Running && !engine.has_announced() {
        engine.notify_observers()?;
    }

    let reason = loop {
        if engine.is_finished() {
            break StopReason::Completed;
        }
        if options.max_ticks.is_some_and(|max| engine.ticks() >= max) {
            break StopReason::TickLimit;
        }
        if stop.is_requested() {
            break StopReason::Interrupted;
        }

        if let Err(e) = engine.advance() {
            warn!(error = %e, "advance failed; finishing run");
            if let Err(finish_err) = engine.notify_finished() {
                warn!(error = %finish_err, "finish notification failed");
            }
            return Err(e);
        }

        if engine.is_finished() {
            break StopReason::Completed;
        }
        if stop.wait(options.pacing) {
            break StopReason::Interrupted;
        }
    };

    engine.notify_finished()?;
    let snapshot = engine.snapshot();
    let summary = RunSummary {
        ticks: engine.ticks(),
        elapsed_s: engine.elapsed_seconds(),
        final_volume: snapshot.map_or_else(|| m3(0.0), |s| s.volume),
        reason,
    };
    info!(
        ticks = summary.ticks,
        elapsed_s = summary.elapsed_s,
        reason = ?summary.reason,
        "run loop ended"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_request_is_seen_once() {
        let (handle, signal) = stop_channel();
        assert!(!signal.is_requested());
        handle.stop();
        handle.stop();
        assert!(signal.is_requested());
        assert!(!signal.is_requested());
    }

    #[test]
    fn wait_wakes_on_stop() {
        let (handle, signal) = stop_channel();
        let stopper = thread::spawn(move || handle.stop());
        assert!(signal.wait(Duration::from_secs(5)));
        stopper.join().unwrap();
    }

    #[test]
    fn dropped_handle_is_not_a_stop() {
        let (handle, signal) = stop_channel();
        drop(handle);
        assert!(!signal.wait(Duration::from_millis(1)));
        assert!(!signal.is_requested());
    }
}
