//! Error types for playbook loading and execution.
//!
//! Every fallible operation in the workspace returns `AgenticResult<T>`.

use thiserror::Error;

use crate::playbook::{StepLocation, StepStatus};

/// The unified error type for the agentic runtime.
#[derive(Debug, Error)]
pub enum AgenticError {
    /// The playbook document is malformed. Fatal at startup.
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// `execute_step` was asked to run a step whose precondition is not met.
    ///
    /// The driver selected a location it should not have (or used a stale
    /// readiness list). Nothing was mutated.
    #[error("condition not met: {condition} (step {location})")]
    ConditionNotMet {
        condition: String,
        location: StepLocation,
    },

    /// The handler reported that the step's work failed. The step is now `Failed`.
    #[error("step '{agent}' failed: {reason}")]
    StepFailed { agent: String, reason: String },

    /// The handler did not finish within the configured bound. The step is now `Failed`.
    #[error("step '{agent}' timed out after {timeout_ms} ms")]
    StepTimedOut { agent: String, timeout_ms: u64 },

    /// The handler observed cancellation and stopped mid-step. The step is now `Failed`.
    #[error("step '{agent}' was cancelled")]
    StepCancelled { agent: String },

    /// The run was cancelled before the step started. Nothing was mutated.
    #[error("execution cancelled")]
    Cancelled,

    /// The location does not name a step in this playbook.
    #[error("no step at location ({branch},{step})")]
    UnknownStep { branch: usize, step: usize },

    /// The step has already left `Pending`; steps never run twice.
    #[error("step {location} is {status}, not pending")]
    StepNotPending {
        location: StepLocation,
        status: StepStatus,
    },

    /// A configuration file is missing, unreadable or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The journal could not record a status transition.
    #[error("journal write failed: {reason}")]
    JournalWriteFailed { reason: String },
}

pub type AgenticResult<T> = Result<T, AgenticError>;
