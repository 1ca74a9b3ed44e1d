//! In-memory implementation of `Journal`.
//!
//! Entries live in a `Vec` behind `Arc<Mutex<_>>`, so a presenter can hold a
//! clone of the journal and read it while the engine owns the boxed writer.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::info;

use agentic_contracts::{
    error::{AgenticError, AgenticResult},
    execution::Transition,
};
use agentic_core::traits::Journal;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{JournalEntry, JournalExport},
};

pub(crate) struct JournalState {
    pub(crate) entries: Vec<JournalEntry>,
    pub(crate) last_hash: String,
    pub(crate) finalized: bool,
}

/// Append-only, hash-chained transition journal.
///
/// Clones share the same underlying chain.
#[derive(Clone)]
pub struct InMemoryJournal {
    run_id: String,
    pub(crate) state: Arc<Mutex<JournalState>>,
}

impl InMemoryJournal {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            state: Arc::new(Mutex::new(JournalState {
                entries: Vec::new(),
                last_hash: JournalEntry::GENESIS_HASH.to_string(),
                finalized: false,
            })),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn lock(&self) -> AgenticResult<MutexGuard<'_, JournalState>> {
        self.state.lock().map_err(|e| AgenticError::JournalWriteFailed {
            reason: format!("journal state lock poisoned: {}", e),
        })
    }

    /// All entries so far, in chain order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.state
            .lock()
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<JournalEntry> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        let start = state.entries.len().saturating_sub(n);
        state.entries[start..].to_vec()
    }

    /// Entries with `sequence >= from`. Lets a follower poll incrementally.
    pub fn since(&self, from: usize) -> Vec<JournalEntry> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        state.entries.get(from..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().map(|s| s.finalized).unwrap_or(false)
    }

    pub fn export(&self) -> JournalExport {
        let (entries, finalized) = self
            .state
            .lock()
            .map(|s| (s.entries.clone(), s.finalized))
            .unwrap_or_default();
        let terminal_hash = entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        JournalExport {
            run_id: self.run_id.clone(),
            entries,
            exported_at: Utc::now(),
            finalized,
            terminal_hash,
        }
    }

    /// Recompute the chain. False if any entry was altered in memory.
    pub fn verify_integrity(&self) -> bool {
        match self.state.lock() {
            Ok(state) => verify_chain(&state.entries),
            Err(_) => false,
        }
    }
}

impl Journal for InMemoryJournal {
    fn record(&self, transition: &Transition) -> AgenticResult<()> {
        let mut state = self.lock()?;

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_entry(&self.run_id, sequence, transition, &prev_hash);

        state.entries.push(JournalEntry {
            sequence,
            run_id: self.run_id.clone(),
            transition: transition.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(())
    }

    fn finalize(&self, run_id: &str) -> AgenticResult<()> {
        let mut state = self.lock()?;
        state.finalized = true;

        info!(
            run_id = %run_id,
            entry_count = state.entries.len(),
            terminal_hash = %state.last_hash,
            "journal finalized"
        );

        Ok(())
    }
}
