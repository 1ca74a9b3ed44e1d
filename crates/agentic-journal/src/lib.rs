//! # agentic-journal
//!
//! Append-only, SHA-256 hash-chained record of step status transitions.
//!
//! ## Overview
//!
//! The engine hands every status write to a `Journal`. `InMemoryJournal`
//! wraps each one in a `JournalEntry` linked to the previous entry by hash,
//! so presenters can show recent activity and a finished run can be checked
//! for tampering with `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agentic_journal::InMemoryJournal;
//!
//! let journal = InMemoryJournal::new(run_id.to_string());
//! let engine = Engine::new(playbook, catalog, handler).with_journal(Box::new(journal.clone()));
//! // ... drive the engine ...
//! for entry in journal.recent(5) {
//!     println!("{}", entry.summary());
//! }
//! assert!(journal.verify_integrity());
//! ```

pub mod chain;
pub mod entry;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use entry::{JournalEntry, JournalExport};
pub use memory::InMemoryJournal;

// ── Tests ─────────────────────────────────────────────────────────────────────
