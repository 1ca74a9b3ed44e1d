//! Run identity, step reports and status-transition records.
//!
//! `StepReport` is what the engine returns after a successful step.
//! `Transition` is what gets written to the journal, one per status write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::playbook::{StepLocation, StepStatus};

/// Unique identifier for one execution of a playbook.
///
/// Appears in every journal entry and every handler request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The result of one successful `execute_step` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub location: StepLocation,
    pub branch: String,
    pub agent: String,
    /// The condition this step set to true on completion.
    pub produced_condition: String,
    /// Wall-clock time spent in the handler.
    pub elapsed_ms: u64,
}

/// An immutable record of one step status write.
///
/// A successful step produces two: `pending → running` and
/// `running → completed`. A failed one ends in `running → failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub run_id: RunId,
    pub location: StepLocation,
    pub branch: String,
    pub agent: String,
    pub from: StepStatus,
    pub to: StepStatus,
    /// Set only on `running → completed`: the condition that became true.
    pub produced_condition: Option<String>,
    /// Failure reason on `running → failed`.
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}
