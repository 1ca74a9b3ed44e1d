//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. run_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. JSON of the transition (serde_json, compact)

use sha2::{Digest, Sha256};

use agentic_contracts::execution::Transition;

use crate::entry::JournalEntry;

/// Compute the SHA-256 hash for one journal entry as lowercase hex.
///
/// # Panics
///
/// Panics if `transition` cannot be serialized to JSON, which cannot happen
/// for the plain-data `Transition` type.
pub fn hash_entry(run_id: &str, sequence: u64, transition: &Transition, prev_hash: &str) -> String {
    let transition_json =
        serde_json::to_vec(transition).expect("Transition must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(run_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&transition_json);

    hex::encode(hasher.finalize())
}

/// Verify a chain: every `prev_hash` links to the previous `this_hash`
/// (genesis for the first), and every `this_hash` recomputes.
///
/// An empty chain is valid.
pub fn verify_chain(entries: &[JournalEntry]) -> bool {
    let mut expected_prev: &str = JournalEntry::GENESIS_HASH;

    for entry in entries {
        if entry.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_entry(
            &entry.run_id,
            entry.sequence,
            &entry.transition,
            &entry.prev_hash,
        );
        if entry.this_hash != recomputed {
            return false;
        }

        expected_prev = entry.this_hash.as_str();
    }

    true
}
