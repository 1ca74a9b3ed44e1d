//! Types exchanged between the engine and a step handler.
//!
//! The engine hands a `WorkRequest` to whatever performs an agent's action and
//! gets a `WorkOutcome` back. A `CancellationToken` is passed alongside so
//! long-running work can stop early.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};

use crate::{execution::RunId, playbook::StepLocation};

/// Everything a handler needs to perform one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRequest {
    pub run_id: RunId,
    pub location: StepLocation,
    /// Name of the branch the step belongs to.
    pub branch: String,
    pub agent: String,
    pub action: String,
    /// The precondition that gated this step (already satisfied).
    pub condition: String,
}

/// What a handler reports after performing a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOutcome {
    Succeeded,
    Failed { reason: String },
    /// The handler noticed its token was cancelled and stopped.
    Cancelled,
}

#[derive(Debug, Default)]
struct TokenNode {
    cancelled: AtomicBool,
    parent: Option<Arc<TokenNode>>,
}

/// Cooperative cancellation signal.
///
/// Clones share the same flag. A token made with [`child`](Self::child)
/// reports cancelled when it or any ancestor is cancelled; cancelling the
/// child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    node: Arc<TokenNode>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.node.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        let mut node = Some(&self.node);
        while let Some(n) = node {
            if n.cancelled.load(Ordering::SeqCst) {
                return true;
            }
            node = n.parent.as_ref();
        }
        false
    }

    pub fn child(&self) -> Self {
        Self {
            node: Arc::new(TokenNode {
                cancelled: AtomicBool::new(false),
                parent: Some(Arc::clone(&self.node)),
            }),
        }
    }
}
