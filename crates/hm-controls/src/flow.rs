//! Shared flow multiplier.
//!
//! The controller is written by a control surface thread and read by the
//! sampler on the driving loop. The value lives in a single `AtomicU64`
//! holding the bits of the clamped percentage, so every read observes a
//! fully written `f64`.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Lowest accepted percentage.
pub const MIN_PERCENT: f64 = 0.0;
/// Highest accepted percentage.
pub const MAX_PERCENT: f64 = 100.0;

/// Clamp a percentage into `[0, 100]`.
///
/// NaN maps to 0 (tap closed); infinities saturate.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return MIN_PERCENT;
    }
    percent.clamp(MIN_PERCENT, MAX_PERCENT)
}

/// Operator-controlled flow multiplier in `[0.0, 1.0]`.
///
/// Set as a percentage and read either as the normalized multiplier or as the
/// rounded percentage for display. Out-of-range input is silently clamped.
///
/// # Example
///
/// ```
/// use hm_controls::FlowController;
///
/// let controller = FlowController::new(100.0);
/// controller.set_percent(135.0);
/// assert_eq!(controller.percent(), 100);
/// controller.set_percent(25.0);
/// assert!((controller.multiplier() - 0.25).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct FlowController {
    percent_bits: AtomicU64,
}

impl FlowController {
    /// Create a controller at the given (clamped) percentage.
    pub fn new(initial_percent: f64) -> Self {
        Self {
            percent_bits: AtomicU64::new(clamp_percent(initial_percent).to_bits()),
        }
    }

    /// Store a new percentage, clamped to `[0, 100]`. Returns the stored value.
    pub fn set_percent(&self, percent: f64) -> f64 {
        let clamped = clamp_percent(percent);
        self.percent_bits.store(clamped.to_bits(), Ordering::Release);
        debug!(requested = percent, stored = clamped, "flow percent set");
        clamped
    }

    /// Shift the percentage by `delta` as one atomic read-modify-write.
    /// Returns the stored value.
    pub fn adjust_percent(&self, delta: f64) -> f64 {
        let mut stored = MIN_PERCENT;
        // The closure always returns Some, so fetch_update cannot fail.
        let _ = self
            .percent_bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                stored = clamp_percent(f64::from_bits(bits) + delta);
                Some(stored.to_bits())
            });
        debug!(delta, stored, "flow percent adjusted");
        stored
    }

    /// Current percentage without rounding.
    pub fn percent_exact(&self) -> f64 {
        f64::from_bits(self.percent_bits.load(Ordering::Acquire))
    }

    /// Normalized multiplier in `[0.0, 1.0]`.
    pub fn multiplier(&self) -> f64 {
        self.percent_exact() / MAX_PERCENT
    }

    /// Rounded percentage for display.
    pub fn percent(&self) -> u32 {
        self.percent_exact().round() as u32
    }

    /// True when the tap is fully closed.
    pub fn is_closed(&self) -> bool {
        self.multiplier() == 0.0
    }
}

impl Default for FlowController {
    /// Fully open.
    fn default() -> Self {
        Self::new(MAX_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn default_is_fully_open() {
        let controller = FlowController::default();
        assert_eq!(controller.percent(), 100);
        assert_eq!(controller.multiplier(), 1.0);
        assert!(!controller.is_closed());
    }

    #[test]
    fn out_of_range_is_clamped() {
        let controller = FlowController::default();
        assert_eq!(controller.set_percent(-20.0), 0.0);
        assert!(controller.is_closed());
        assert_eq!(controller.set_percent(250.0), 100.0);
        assert_eq!(controller.multiplier(), 1.0);
        assert_eq!(controller.set_percent(f64::NAN), 0.0);
        assert_eq!(controller.set_percent(f64::INFINITY), 100.0);
    }

    #[test]
    fn adjust_saturates_at_bounds() {
        let controller = FlowController::new(90.0);
        assert_eq!(controller.adjust_percent(25.0), 100.0);
        assert_eq!(controller.adjust_percent(-30.0), 70.0);
        assert_eq!(controller.adjust_percent(-500.0), 0.0);
    }

    #[test]
    fn percent_rounds_for_display() {
        let controller = FlowController::new(33.4);
        assert_eq!(controller.percent(), 33);
        controller.set_percent(66.5);
        assert_eq!(controller.percent(), 67);
    }

    #[test]
    fn concurrent_writers_leave_a_valid_value() {
        let controller = Arc::new(FlowController::default());
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || {
                    for step in 0..1_000 {
                        controller.set_percent(f64::from((step * (i + 1)) % 140));
                    }
                })
            })
            .collect();

        for _ in 0..1_000 {
            let m = controller.multiplier();
            assert!((0.0..=1.0).contains(&m));
        }
        for w in writers {
            w.join().unwrap();
        }
        assert!((0.0..=1.0).contains(&controller.multiplier()));
    }
}
