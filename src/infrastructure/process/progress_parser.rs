use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Receives overall progress increments (percentage points, may be negative)
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter: Send + Sync {
    fn report(&self, increment: i32);
}

/// Reporter that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _increment: i32) {}
}

/// Consumes a process's diagnostic stream one line at a time
pub trait LineConsumer: Send {
    fn consume(&mut self, line: &str);
}

struct Phase {
    pattern: Regex,
    start: u32,
    span: u32,
}

fn phases() -> &'static [Phase] {
    static PHASES: OnceLock<Vec<Phase>> = OnceLock::new();
    PHASES.get_or_init(|| {
        [
            (r"(?i)Counting objects:\s*(\d+)%", 0, 10),
            (r"(?i)Compressing objects:\s*(\d+)%", 10, 10),
            (r"(?i)Receiving objects:\s*(\d+)%", 20, 40),
            (r"(?i)Resolving deltas:\s*(\d+)%", 60, 40),
        ]
        .into_iter()
        .map(|(pattern, start, span)| Phase {
            pattern: Regex::new(pattern).expect("progress pattern is valid"),
            start,
            span,
        })
        .collect()
    })
}

/// Turns git's per-phase percentages into increments on a 0-100 scale.
///
/// Counting maps to [0,10), compressing to [10,20), receiving to [20,60) and
/// resolving deltas to [60,100].
pub struct ProgressParser {
    reporter: Arc<dyn ProgressReporter>,
    previous: u32,
}

impl ProgressParser {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            previous: 0,
        }
    }

    /// Last overall percentage reported
    pub fn overall(&self) -> u32 {
        self.previous
    }

    fn overall_for(line: &str) -> Option<u32> {
        phases().iter().find_map(|phase| {
            let captures = phase.pattern.captures(line)?;
            let percent: u32 = captures.get(1)?.as_str().parse().ok()?;
            let percent = percent.min(100);
            // integer division floors the phase-weighted share
            Some(phase.start + percent * phase.span / 100)
        })
    }
}

impl LineConsumer for ProgressParser {
    fn consume(&mut self, line: &str) {
        let Some(total) = Self::overall_for(line) else {
            return;
        };

        if total != self.previous {
            let increment = total as i32 - self.previous as i32;
            self.reporter.report(increment);
            self.previous = total;
        }
    }
}
