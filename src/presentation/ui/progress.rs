use crate::infrastructure::process::ProgressReporter;
use indicatif::ProgressBar;

/// Feeds checkout progress increments into an `indicatif` bar
#[derive(Debug, Clone)]
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressReporter for BarReporter {
    fn report(&self, increment: i32) {
        // Increments can be negative when git restarts a phase
        let next = (self.bar.position() as i64 + increment as i64).clamp(0, 100);
        self.bar.set_position(next as u64);
    }
}
