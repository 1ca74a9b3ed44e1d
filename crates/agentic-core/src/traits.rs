//! Trait seams of the execution engine.
//!
//! - `CompletionConditions` maps an agent name to the condition it produces
//! - `StepHandler` performs a step's work
//! - `Journal` records every step status transition
//!
//! The engine owns scheduling and state; everything it delegates goes
//! through one of these.

use agentic_contracts::{
    error::AgenticResult,
    execution::Transition,
    work::{CancellationToken, WorkOutcome, WorkRequest},
};

/// Resolves the condition a step sets to true when it completes.
///
/// This is the graph-edge mechanism: a step's output condition is implied by
/// its agent. Implementations must be pure and deterministic.
pub trait CompletionConditions: Send + Sync {
    fn completion_condition(&self, agent: &str) -> String;
}

/// Performs the work behind one step.
///
/// Called by the engine only after the step's precondition has been
/// re-validated and its status moved to `Running`. Implementations should
/// poll `cancel` during long work and return `WorkOutcome::Cancelled` once it
/// fires; the engine cancels it when a per-step timeout expires.
pub trait StepHandler: Send + Sync {
    fn perform(&self, request: &WorkRequest, cancel: &CancellationToken) -> WorkOutcome;
}

/// Append-only sink for step status transitions.
///
/// A failed write is surfaced to the caller as `JournalWriteFailed`.
pub trait Journal: Send + Sync {
    fn record(&self, transition: &Transition) -> AgenticResult<()>;

    /// Called once when the playbook reports complete.
    fn finalize(&self, run_id: &str) -> AgenticResult<()>;
}

/// A journal that discards everything. The engine's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn record(&self, _transition: &Transition) -> AgenticResult<()> {
        Ok(())
    }

    fn finalize(&self, _run_id: &str) -> AgenticResult<()> {
        Ok(())
    }
}
