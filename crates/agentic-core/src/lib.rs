//! # agentic-core
//!
//! The dependency-driven execution engine for agentic playbooks.
//!
//! This crate provides:
//! - The three seams (`CompletionConditions`, `StepHandler`, `Journal`)
//! - `ConditionSet`, the per-run map of named facts
//! - The `Engine`, which evaluates readiness and executes one step per call
//! - A first-ready `driver` for presenters that don't need their own policy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agentic_core::{Engine, driver};
//!
//! let mut engine = Engine::new(playbook, Box::new(catalog), Arc::new(handler));
//! let summary = driver::run_to_end(&mut engine, |_, event| println!("{:?}", event))?;
//! ```

pub mod conditions;
pub mod driver;
pub mod engine;
pub mod traits;

pub use conditions::{ConditionSet, START_CONDITION};
pub use engine::Engine;
