//! The reference driver: first-ready, one step at a time.
//!
//! Presenters that want full control call `Engine` directly. The CLI and the
//! TUI use `step_once` / `run_to_end`, which implement the plain policy of
//! executing the first executable location in scan order.

use tracing::{debug, info};

use agentic_contracts::{
    error::{AgenticError, AgenticResult},
    execution::StepReport,
    playbook::StepLocation,
};

use crate::engine::Engine;

/// What a single driving step did.
#[derive(Debug)]
pub enum DriveEvent {
    /// A step ran to completion.
    Executed(StepReport),
    /// A step ran and failed (handler failure, timeout or mid-step cancel).
    /// The step is now `Failed`.
    StepFailed {
        location: StepLocation,
        error: AgenticError,
    },
    /// Every step is `Completed`. Nothing was executed.
    Complete,
    /// Nothing is executable but the playbook is not complete.
    Stalled,
}

/// Why `run_to_end` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete,
    Stalled,
    Cancelled,
}

/// Totals for one `run_to_end` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub completed: usize,
    pub failed: usize,
    pub outcome: RunOutcome,
}

/// Execute the first executable step, if any.
///
/// Step failures come back as `DriveEvent::StepFailed`. Contract violations
/// (`ConditionNotMet`), cancellation and journal errors come back as `Err`.
pub fn step_once(engine: &mut Engine) -> AgenticResult<DriveEvent> {
    if engine.is_playbook_complete() {
        return Ok(DriveEvent::Complete);
    }

    let Some(next) = engine.next_executable_steps().into_iter().next() else {
        return Ok(DriveEvent::Stalled);
    };

    debug!(run_id = %engine.run_id(), location = %next, "driver selected step");

    match engine.execute_step(next.branch_index, next.step_index) {
        Ok(report) => Ok(DriveEvent::Executed(report)),
        Err(
            error @ (AgenticError::StepFailed { .. }
            | AgenticError::StepTimedOut { .. }
            | AgenticError::StepCancelled { .. }),
        ) => Ok(DriveEvent::StepFailed { location: next, error }),
        Err(e) => Err(e),
    }
}

/// Drive until the playbook completes, stalls or the run is cancelled.
///
/// `on_event` sees every event, including the final `Complete` / `Stalled`,
/// together with the engine so the caller can render state between steps.
pub fn run_to_end<F>(engine: &mut Engine, mut on_event: F) -> AgenticResult<RunSummary>
where
    F: FnMut(&Engine, &DriveEvent),
{
    let mut summary = RunSummary {
        executed: 0,
        completed: 0,
        failed: 0,
        outcome: RunOutcome::Stalled,
    };

    loop {
        if engine.cancellation_token().is_cancelled() {
            summary.outcome = RunOutcome::Cancelled;
            break;
        }

        let event = match step_once(engine) {
            Ok(event) => event,
            Err(AgenticError::Cancelled) => {
                summary.outcome = RunOutcome::Cancelled;
                break;
            }
            Err(e) => return Err(e),
        };

        on_event(engine, &event);

        match event {
            DriveEvent::Executed(_) => {
                summary.executed += 1;
                summary.completed += 1;
            }
            DriveEvent::StepFailed { .. } => {
                summary.executed += 1;
                summary.failed += 1;
            }
            DriveEvent::Complete => {
                summary.outcome = RunOutcome::Complete;
                break;
            }
            DriveEvent::Stalled => {
                summary.outcome = RunOutcome::Stalled;
                break;
            }
        }
    }

    info!(
        run_id = %engine.run_id(),
        executed = summary.executed,
        failed = summary.failed,
        outcome = ?summary.outcome,
        "driver finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use agentic_contracts::{
        playbook::{Branch, Playbook, Step, StepLocation, StepStatus},
        work::{CancellationToken, WorkOutcome, WorkRequest},
    };

    use crate::{
        engine::Engine,
        traits::{CompletionConditions, StepHandler},
    };

    use super::{run_to_end, step_once, DriveEvent, RunOutcome};

    struct SuffixCatalog;

    impl CompletionConditions for SuffixCatalog {
        fn completion_condition(&self, agent: &str) -> String {
            format!("{}-completed", agent)
        }
    }

    /// Succeeds for everything except `fail_agent`, and logs the order of calls.
    struct OrderHandler {
        order: Mutex<Vec<String>>,
        fail_agent: Option<String>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl OrderHandler {
        fn new() -> Self {
            Self { order: Mutex::new(vec![]), fail_agent: None, cancel_after: None }
        }
    }

    impl StepHandler for OrderHandler {
        fn perform(&self, request: &WorkRequest, _cancel: &CancellationToken) -> WorkOutcome {
            let mut order = self.order.lock().unwrap();
            order.push(request.agent.clone());
            if let Some((n, token)) = &self.cancel_after {
                if order.len() == *n {
                    token.cancel();
                }
            }
            if self.fail_agent.as_deref() == Some(request.agent.as_str()) {
                return WorkOutcome::Failed { reason: "scripted".to_string() };
            }
            WorkOutcome::Succeeded
        }
    }

    /// a → b (across branches) and an independent c.
    fn playbook() -> Playbook {
        Playbook::new(
            "drive",
            vec![
                Branch::new("first", vec![Step::new("b", "a-completed", "")]),
                Branch::new(
                    "second",
                    vec![Step::new("a", "start", ""), Step::new("c", "start", "")],
                ),
            ],
        )
    }

    #[test]
    fn runs_first_ready_until_complete() {
        let handler = Arc::new(OrderHandler::new());
        let mut engine = Engine::new(playbook(), Box::new(SuffixCatalog), handler.clone());

        let mut events = 0;
        let summary = run_to_end(&mut engine, |_, _| events += 1).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Complete);
        assert_eq!(summary.executed, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(events, 4, "three executions plus the final Complete");
        // Scan order after `a` completes puts `b` (branch 0) ahead of `c`.
        assert_eq!(*handler.order.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(engine.is_playbook_complete());
    }

    #[test]
    fn failure_does_not_abort_run_but_stalls_dependents() {
        let handler = Arc::new(OrderHandler {
            fail_agent: Some("a".to_string()),
            ..OrderHandler::new()
        });
        let mut engine = Engine::new(playbook(), Box::new(SuffixCatalog), handler.clone());

        let mut failures = vec![];
        let summary = run_to_end(&mut engine, |_, event| {
            if let DriveEvent::StepFailed { location, .. } = event {
                failures.push(*location);
            }
        })
        .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Stalled);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(failures, vec![StepLocation::new(1, 0)]);
        assert_eq!(
            engine.step(StepLocation::new(0, 0)).unwrap().status,
            StepStatus::Pending,
            "b depends on the failed step and never runs"
        );
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let token = CancellationToken::new();
        let handler = Arc::new(OrderHandler {
            cancel_after: Some((1, token.clone())),
            ..OrderHandler::new()
        });
        let mut engine = Engine::new(playbook(), Box::new(SuffixCatalog), handler.clone())
            .with_cancellation(token);

        let summary = run_to_end(&mut engine, |_, _| {}).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.executed, 1);
        assert_eq!(handler.order.lock().unwrap().len(), 1);
    }

    #[test]
    fn step_once_reports_complete_and_stalled() {
        let mut done = Engine::new(
            Playbook::new("empty", vec![]),
            Box::new(SuffixCatalog),
            Arc::new(OrderHandler::new()),
        );
        assert!(matches!(step_once(&mut done).unwrap(), DriveEvent::Complete));

        let blocked = Playbook::new(
            "blocked",
            vec![Branch::new("x", vec![Step::new("z", "missing", "")])],
        );
        let mut stuck = Engine::new(blocked, Box::new(SuffixCatalog), Arc::new(OrderHandler::new()));
        assert!(matches!(step_once(&mut stuck).unwrap(), DriveEvent::Stalled));
    }
}
