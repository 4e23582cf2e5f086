//! Line-oriented flow control surface (stdin in the CLI).

use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hm_controls::{FlowCommand, FlowController};
use hm_sim::StopHandle;
use tracing::{info, warn};

use crate::error::AppResult;

/// Effect of one input line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlOutcome {
    /// Flow percentage now stored in the controller.
    FlowSet(f64),
    /// A graceful stop was requested.
    StopRequested,
    /// Blank line; nothing to do.
    Ignored,
}

/// Apply one line of operator input.
pub fn handle_line(
    line: &str,
    controller: &FlowController,
    stop: &StopHandle,
) -> AppResult<ControlOutcome> {
    if line.trim().is_empty() {
        return Ok(ControlOutcome::Ignored);
    }
    let command: FlowCommand = line.parse()?;
    match command.apply(controller) {
        Some(percent) => {
            info!(percent, "flow opening changed");
            Ok(ControlOutcome::FlowSet(percent))
        }
        None => {
            stop.stop();
            Ok(ControlOutcome::StopRequested)
        }
    }
}

/// Read commands from `input` on a background thread until a stop command
/// or end of input. End of input leaves the run going.
pub fn spawn_control<R>(
    input: R,
    controller: Arc<FlowController>,
    stop: StopHandle,
) -> AppResult<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("hm-control".to_string())
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else {
                    warn!("control input unreadable; control surface closed");
                    return;
                };
                match handle_line(&line, &controller, &stop) {
                    Ok(ControlOutcome::StopRequested) => return,
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, input = line.as_str(), "command ignored"),
                }
            }
        })?;
    Ok(handle)
}
