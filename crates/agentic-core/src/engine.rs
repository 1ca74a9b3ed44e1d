//! The execution engine: condition tracking, readiness and step execution.
//!
//! The engine never schedules itself. A driver asks for the executable
//! steps, picks one, and calls `execute_step`:
//!
//!   Locate → Precondition → Pending? → Running → [StepHandler::perform] → Completed | Failed
//!
//! A step never leaves `Pending` unless its precondition holds at the moment
//! `execute_step` runs. That re-check is what protects against a stale
//! readiness list.
//!
//! The engine is single-driver: `&mut self` on every mutating call is the
//! only synchronization it has.

use std::{
    sync::{mpsc, Arc},
    thread,
    time::{Duration, Instant},
};

use chrono::Utc;
use tracing::{debug, info, warn};

use agentic_contracts::{
    error::{AgenticError, AgenticResult},
    execution::{RunId, StepReport, Transition},
    playbook::{Playbook, Step, StepLocation, StepStatus},
    work::{CancellationToken, WorkOutcome, WorkRequest},
};

use crate::{
    conditions::ConditionSet,
    traits::{CompletionConditions, Journal, NullJournal, StepHandler},
};

/// What came back from a handler invocation.
enum Performed {
    Finished(WorkOutcome),
    TimedOut(Duration),
}

/// Drives one playbook execution.
///
/// Owns the playbook and the condition set exclusively for the lifetime of
/// the run. Presenters observe it through the read-only accessors.
pub struct Engine {
    run_id: RunId,
    playbook: Playbook,
    conditions: ConditionSet,
    catalog: Box<dyn CompletionConditions>,
    handler: Arc<dyn StepHandler>,
    journal: Box<dyn Journal>,
    step_timeout: Option<Duration>,
    cancel: CancellationToken,
    finalized: bool,
}

impl Engine {
    /// Create an engine for `playbook`.
    ///
    /// The condition set starts empty. No journal and no step timeout are
    /// configured; see the `with_*` methods.
    pub fn new(
        playbook: Playbook,
        catalog: Box<dyn CompletionConditions>,
        handler: Arc<dyn StepHandler>,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            playbook,
            conditions: ConditionSet::new(),
            catalog,
            handler,
            journal: Box::new(NullJournal),
            step_timeout: None,
            cancel: CancellationToken::new(),
            finalized: false,
        }
    }

    pub fn with_journal(mut self, journal: Box<dyn Journal>) -> Self {
        self.journal = journal;
        self
    }

    /// Bound every handler invocation. An expired bound fails the step with
    /// `StepTimedOut` and cancels the handler's token.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    /// Use `token` as the run-wide cancellation signal.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    // ── Read-only observation ────────────────────────────────────────────────

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn playbook(&self) -> &Playbook {
        &self.playbook
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn step(&self, location: StepLocation) -> Option<&Step> {
        self.playbook.step(location)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// `start` is always met; anything else reads from the condition set.
    pub fn is_condition_met(&self, name: &str) -> bool {
        self.conditions.is_met(name)
    }

    /// The condition `step` produces when it completes.
    pub fn completion_condition_for(&self, step: &Step) -> String {
        self.catalog.completion_condition(&step.agent)
    }

    /// Every `Pending` step whose precondition is currently met, in
    /// branch-then-step order.
    pub fn next_executable_steps(&self) -> Vec<StepLocation> {
        self.playbook
            .steps()
            .filter(|(_, step)| {
                step.status == StepStatus::Pending && self.is_condition_met(&step.condition)
            })
            .map(|(location, _)| location)
            .collect()
    }

    /// True iff every step in every branch is `Completed`.
    ///
    /// A single `Failed` step keeps this false for the rest of the run.
    pub fn is_playbook_complete(&self) -> bool {
        self.playbook
            .steps()
            .all(|(_, step)| step.status == StepStatus::Completed)
    }

    /// Not complete, and nothing left that can run.
    pub fn is_stalled(&self) -> bool {
        !self.is_playbook_complete() && self.next_executable_steps().is_empty()
    }

    pub fn failed_steps(&self) -> Vec<StepLocation> {
        self.playbook
            .steps()
            .filter(|(_, step)| step.status == StepStatus::Failed)
            .map(|(location, _)| location)
            .collect()
    }

    /// `(completed, total)` step counts.
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .playbook
            .steps()
            .filter(|(_, step)| step.status == StepStatus::Completed)
            .count();
        (completed, self.playbook.step_count())
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Overwrite a condition. Nothing in the engine ever clears one.
    pub fn set_condition(&mut self, name: impl Into<String>, value: bool) {
        let name = name.into();
        debug!(run_id = %self.run_id, condition = %name, value, "condition set");
        self.conditions.set(name, value);
    }

    /// Execute the step at `(branch_index, step_index)`.
    ///
    /// # Pipeline
    ///
    /// 1. Resolve the location (`UnknownStep` if out of range)
    /// 2. Re-validate the precondition (`ConditionNotMet`, nothing mutated)
    /// 3. Refuse steps that already left `Pending` (`StepNotPending`)
    /// 4. Refuse to start once the run is cancelled (`Cancelled`)
    /// 5. `Pending → Running`, then invoke the handler (bounded by the step timeout)
    /// 6. On success: `Running → Completed` and the completion condition is set true
    /// 7. On failure, timeout or cancellation: `Running → Failed`, no condition is set
    ///
    /// A journal write that fails at step 5 puts the step back to `Pending`
    /// without running the handler. At steps 6 and 7 the in-memory transition
    /// (status plus condition) is applied in full before `JournalWriteFailed`
    /// is returned.
    ///
    /// Blocks until the handler returns or the timeout expires.
    pub fn execute_step(
        &mut self,
        branch_index: usize,
        step_index: usize,
    ) -> AgenticResult<StepReport> {
        let location = StepLocation::new(branch_index, step_index);
        let step = self
            .playbook
            .step(location)
            .ok_or(AgenticError::UnknownStep {
                branch: branch_index,
                step: step_index,
            })?;

        // ── Steps 1-4: gatekeeping, no mutation ──────────────────────────────
        if !self.is_condition_met(&step.condition) {
            warn!(
                run_id = %self.run_id,
                location = %location,
                condition = %step.condition,
                "precondition not met, step refused"
            );
            return Err(AgenticError::ConditionNotMet {
                condition: step.condition.clone(),
                location,
            });
        }

        if step.status != StepStatus::Pending {
            return Err(AgenticError::StepNotPending {
                location,
                status: step.status,
            });
        }

        if self.cancel.is_cancelled() {
            return Err(AgenticError::Cancelled);
        }

        let branch = self.playbook.branches[branch_index].name.clone();
        let produced = self.completion_condition_for(step);
        let request = WorkRequest {
            run_id: self.run_id,
            location,
            branch: branch.clone(),
            agent: step.agent.clone(),
            action: step.action.clone(),
            condition: step.condition.clone(),
        };

        // ── Step 5: run the work ─────────────────────────────────────────────
        if let Err(e) = self.set_status(location, StepStatus::Running, None, None) {
            // Nothing ran: put the step back so it stays executable.
            if let Some(step) = self.playbook.step_mut(location) {
                step.status = StepStatus::Pending;
            }
            return Err(e);
        }
        info!(
            run_id = %self.run_id,
            location = %location,
            agent = %request.agent,
            "step running"
        );

        let started = Instant::now();
        let agent = request.agent.clone();
        let performed = self.perform(request);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        // ── Steps 6 & 7: record the outcome ──────────────────────────────────
        match performed {
            Performed::Finished(WorkOutcome::Succeeded) => {
                // The condition is set even if the journal refuses the write:
                // a `Completed` step always has its condition met.
                let recorded =
                    self.set_status(location, StepStatus::Completed, Some(produced.clone()), None);
                self.set_condition(produced.clone(), true);
                recorded?;
                info!(
                    run_id = %self.run_id,
                    location = %location,
                    agent = %agent,
                    condition = %produced,
                    elapsed_ms,
                    "step completed"
                );

                if self.is_playbook_complete() && !self.finalized {
                    self.finalized = true;
                    info!(run_id = %self.run_id, playbook = %self.playbook.name, "playbook complete");
                    self.journal.finalize(&self.run_id.to_string())?;
                }

                Ok(StepReport {
                    location,
                    branch,
                    agent,
                    produced_condition: produced,
                    elapsed_ms,
                })
            }

            Performed::Finished(WorkOutcome::Failed { reason }) => {
                self.fail(location, &agent, reason.clone())?;
                Err(AgenticError::StepFailed { agent, reason })
            }

            Performed::Finished(WorkOutcome::Cancelled) => {
                self.fail(location, &agent, "cancelled".to_string())?;
                Err(AgenticError::StepCancelled { agent })
            }

            Performed::TimedOut(timeout) => {
                let timeout_ms = timeout.as_millis() as u64;
                self.fail(location, &agent, format!("timed out after {} ms", timeout_ms))?;
                Err(AgenticError::StepTimedOut { agent, timeout_ms })
            }
        }
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Invoke the handler, on a worker thread when a timeout is configured.
    fn perform(&self, request: WorkRequest) -> Performed {
        let token = self.cancel.child();

        let Some(timeout) = self.step_timeout else {
            return Performed::Finished(self.handler.perform(&request, &token));
        };

        let (tx, rx) = mpsc::channel();
        let handler = Arc::clone(&self.handler);
        let worker_token = token.clone();
        let spawned = thread::Builder::new()
            .name(format!("step-{}", request.agent))
            .spawn(move || {
                let outcome = handler.perform(&request, &worker_token);
                // The receiver is gone once the step timed out.
                let _ = tx.send(outcome);
            });

        if let Err(e) = spawned {
            return Performed::Finished(WorkOutcome::Failed {
                reason: format!("failed to spawn step worker: {}", e),
            });
        }

        match rx.recv_timeout(timeout) {
            Ok(outcome) => Performed::Finished(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                token.cancel();
                Performed::TimedOut(timeout)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Performed::Finished(WorkOutcome::Failed {
                reason: "step handler exited without an outcome".to_string(),
            }),
        }
    }

    fn fail(&mut self, location: StepLocation, agent: &str, reason: String) -> AgenticResult<()> {
        warn!(
            run_id = %self.run_id,
            location = %location,
            agent = %agent,
            reason = %reason,
            "step failed"
        );
        self.set_status(location, StepStatus::Failed, None, Some(reason))
    }

    /// Write a status and journal the transition.
    fn set_status(
        &mut self,
        location: StepLocation,
        to: StepStatus,
        produced_condition: Option<String>,
        detail: Option<String>,
    ) -> AgenticResult<()> {
        let step = self
            .playbook
            .step_mut(location)
            .ok_or(AgenticError::UnknownStep {
                branch: location.branch_index,
                step: location.step_index,
            })?;
        let from = step.status;
        step.status = to;
        let agent = step.agent.clone();

        let transition = Transition {
            run_id: self.run_id,
            location,
            branch: self.playbook.branches[location.branch_index].name.clone(),
            agent,
            from,
            to,
            produced_condition,
            detail,
            timestamp: Utc::now(),
        };
        self.journal.record(&transition)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
