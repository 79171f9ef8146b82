//! Build timing utilities.

use std::time::Instant;

use tracing::debug;

/// A simple timer for measuring build phase durations.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer with the given phase name.
    pub fn start(name: &str) -> Self {
        debug!(phase = name, "phase started");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Finish the timer and print the elapsed time.
    pub fn finish(self) {
        let secs = self.start.elapsed().as_secs_f64();
        if secs >= 1.0 {
            println!("  [{:.1}s] {}", secs, self.name);
        } else {
            println!("  [{:.0}ms] {}", secs * 1000.0, self.name);
        }
    }
}
