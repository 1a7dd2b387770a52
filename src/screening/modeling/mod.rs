pub mod behavior;
pub mod window;

pub use behavior::{BehavioralSignalRecorder, SignalHistory};
pub use window::PerformanceWindow;

/// Rounds to 3 decimal places so derived scores compare stably.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
