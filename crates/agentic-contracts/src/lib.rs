//! # agentic-contracts
//!
//! Shared types for the agentic playbook runtime: the playbook model, step
//! locations, handler request/outcome types, transition records and the
//! unified error type.
//!
//! No scheduling logic lives here. The engine in `agentic-core` owns
//! readiness evaluation and status mutation.

pub mod error;
pub mod execution;
pub mod playbook;
pub mod work;

pub use playbook::parse;
