//! Simulated work: a fixed, bounded delay per step.
//!
//! Stands in for a real agent. The delay is served in short slices so a
//! cancelled token (run cancellation or step timeout) stops the work
//! promptly instead of after the full delay.

use std::{
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

use agentic_contracts::work::{CancellationToken, WorkOutcome, WorkRequest};
use agentic_core::traits::StepHandler;

/// Default simulated work per step.
pub const DEFAULT_WORK: Duration = Duration::from_millis(500);

const SLICE: Duration = Duration::from_millis(10);

/// Sleeps for `work` and then succeeds, unless cancelled first.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedHandler {
    work: Duration,
}

impl SimulatedHandler {
    pub fn new(work: Duration) -> Self {
        Self { work }
    }

    /// No delay at all. Useful for tests and dry runs.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn work(&self) -> Duration {
        self.work
    }
}

impl Default for SimulatedHandler {
    fn default() -> Self {
        Self::new(DEFAULT_WORK)
    }
}

impl StepHandler for SimulatedHandler {
    fn perform(&self, request: &WorkRequest, cancel: &CancellationToken) -> WorkOutcome {
        debug!(
            agent = %request.agent,
            action = %request.action,
            work_ms = self.work.as_millis() as u64,
            "simulating step work"
        );

        let deadline = Instant::now() + self.work;
        loop {
            if cancel.is_cancelled() {
                return WorkOutcome::Cancelled;
            }
            let now = Instant::now();
            if now >= deadline {
                return WorkOutcome::Succeeded;
            }
            thread::sleep(SLICE.min(deadline - now));
        }
    }
}
