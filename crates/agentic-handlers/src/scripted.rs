//! Scripted outcomes layered over another handler.
//!
//! `ScriptedHandler` answers for agents it has a script for and delegates
//! everything else. Used to rehearse failure paths (`--fail-agent` in the
//! CLI) without a real agent misbehaving.

use std::{collections::HashMap, sync::Arc};

use tracing::info;

use agentic_contracts::work::{CancellationToken, WorkOutcome, WorkRequest};
use agentic_core::traits::StepHandler;

pub struct ScriptedHandler {
    inner: Arc<dyn StepHandler>,
    scripts: HashMap<String, WorkOutcome>,
}

impl ScriptedHandler {
    pub fn new(inner: Arc<dyn StepHandler>) -> Self {
        Self {
            inner,
            scripts: HashMap::new(),
        }
    }

    /// Steps run by `agent` report `outcome` without calling the inner handler.
    pub fn script(mut self, agent: impl Into<String>, outcome: WorkOutcome) -> Self {
        self.scripts.insert(agent.into(), outcome);
        self
    }

    /// Shorthand for scripting a failure.
    pub fn fail(self, agent: impl Into<String>, reason: impl Into<String>) -> Self {
        self.script(agent, WorkOutcome::Failed { reason: reason.into() })
    }

    pub fn is_scripted(&self, agent: &str) -> bool {
        self.scripts.contains_key(agent)
    }
}

impl StepHandler for ScriptedHandler {
    fn perform(&self, request: &WorkRequest, cancel: &CancellationToken) -> WorkOutcome {
        match self.scripts.get(&request.agent) {
            Some(outcome) => {
                info!(agent = %request.agent, outcome = ?outcome, "scripted outcome");
                outcome.clone()
            }
            None => self.inner.perform(request, cancel),
        }
    }
}
