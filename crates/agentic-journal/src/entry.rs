//! Journal entry and export types.
//!
//! `JournalEntry` wraps one step `Transition` with a sequence number and the
//! SHA-256 hashes linking it to the previous entry. `JournalExport` is the
//! snapshot handed to presenters or written out after a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agentic_contracts::{execution::Transition, playbook::StepStatus};

/// A single link in the transition chain for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub run_id: String,

    pub transition: Transition,

    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over run_id, sequence, prev_hash and the transition.
    pub this_hash: String,
}

impl JournalEntry {
    /// The `prev_hash` of the first entry in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    /// One-line, human-readable form used by activity views.
    ///
    /// `✓ ingest: data-collector completed`, `✗ notify: email-sender failed: smtp down`.
    pub fn summary(&self) -> String {
        let t = &self.transition;
        match t.to {
            StepStatus::Completed => format!("✓ {}: {} completed", t.branch, t.agent),
            StepStatus::Running => format!("⟳ {}: {} running", t.branch, t.agent),
            StepStatus::Failed => match &t.detail {
                Some(detail) => format!("✗ {}: {} failed: {}", t.branch, t.agent, detail),
                None => format!("✗ {}: {} failed", t.branch, t.agent),
            },
            StepStatus::Pending => format!("○ {}: {} pending", t.branch, t.agent),
        }
    }
}

/// Snapshot of a run's journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalExport {
    pub run_id: String,

    /// All entries in chain order.
    pub entries: Vec<JournalEntry>,

    /// When the snapshot was taken (UTC).
    pub exported_at: DateTime<Utc>,

    /// Set once the engine reported the playbook complete.
    pub finalized: bool,

    /// `this_hash` of the last entry. Empty if the journal is empty.
    pub terminal_hash: String,
}
