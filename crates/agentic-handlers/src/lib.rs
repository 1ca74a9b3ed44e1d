//! # agentic-handlers
//!
//! Reference `StepHandler` implementations and sample playbooks.
//!
//! 1. **SimulatedHandler**: a fixed, cancellable delay per step.
//! 2. **ScriptedHandler**: per-agent canned outcomes over another handler,
//!    used to rehearse failures.
//! 3. **samples**: embedded playbooks exercising cross-branch dependencies
//!    and custom catalog entries.
//!
//! No external calls are made.

pub mod samples;
pub mod scripted;
pub mod simulated;

pub use samples::Sample;
pub use scripted::ScriptedHandler;
pub use simulated::{SimulatedHandler, DEFAULT_WORK};

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };

    use agentic_contracts::{
        error::AgenticError,
        execution::RunId,
        playbook::{StepLocation, StepStatus},
        work::{CancellationToken, WorkOutcome, WorkRequest},
    };
    use agentic_core::{
        driver::{self, DriveEvent, RunOutcome},
        traits::StepHandler,
        Engine,
    };

    use super::*;

    fn request(agent: &str) -> WorkRequest {
        WorkRequest {
            run_id: RunId::new(),
            location: StepLocation::new(0, 0),
            branch: "main".to_string(),
            agent: agent.to_string(),
            action: "do it".to_string(),
            condition: "start".to_string(),
        }
    }

    // ── SimulatedHandler ──────────────────────────────────────────────────────

    #[test]
    fn simulated_handler_waits_then_succeeds() {
        let handler = SimulatedHandler::new(Duration::from_millis(30));
        let started = Instant::now();
        let outcome = handler.perform(&request("tracker"), &CancellationToken::new());

        assert_eq!(outcome, WorkOutcome::Succeeded);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn simulated_handler_stops_when_cancelled() {
        let handler = SimulatedHandler::new(Duration::from_secs(10));
        let token = CancellationToken::new();
        token.cancel();

        let started = Instant::now();
        let outcome = handler.perform(&request("tracker"), &token);

        assert_eq!(outcome, WorkOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn simulated_handler_default_is_half_a_second() {
        assert_eq!(SimulatedHandler::default().work(), Duration::from_millis(500));
    }

    // ── ScriptedHandler ───────────────────────────────────────────────────────

    #[test]
    fn scripted_handler_overrides_only_scripted_agents() {
        let handler = ScriptedHandler::new(Arc::new(SimulatedHandler::instant()))
            .fail("email-sender", "smtp relay refused connection");

        assert!(handler.is_scripted("email-sender"));
        assert_eq!(
            handler.perform(&request("email-sender"), &CancellationToken::new()),
            WorkOutcome::Failed { reason: "smtp relay refused connection".to_string() }
        );
        assert_eq!(
            handler.perform(&request("tracker"), &CancellationToken::new()),
            WorkOutcome::Succeeded
        );
    }

    // ── Samples ───────────────────────────────────────────────────────────────

    #[test]
    fn every_sample_parses_and_resolves_by_name() {
        for sample in Sample::ALL {
            let playbook = sample.playbook().unwrap();
            assert!(playbook.step_count() > 0, "{} has no steps", sample.name());
            assert_eq!(Sample::from_name(sample.name()), Some(sample));
        }
        assert_eq!(Sample::from_name("nope"), None);
    }

    /// The onboarding sample only becomes ready one branch at a time.
    #[test]
    fn onboarding_runs_to_completion_in_dependency_order() {
        let sample = Sample::CustomerOnboarding;
        let mut engine = Engine::new(
            sample.playbook().unwrap(),
            Box::new(sample.catalog().unwrap()),
            Arc::new(SimulatedHandler::instant()),
        );

        assert_eq!(engine.next_executable_steps(), vec![StepLocation::new(0, 0)]);

        let mut agents = vec![];
        let summary = driver::run_to_end(&mut engine, |_, event| {
            if let DriveEvent::Executed(report) = event {
                agents.push(report.agent.clone());
            }
        })
        .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Complete);
        assert_eq!(
            agents,
            vec!["data-collector", "data-validator", "email-sender", "tracker", "reporter"]
        );
        for condition in [
            "data-collected",
            "data-validated",
            "email-sent",
            "tracking-active",
            "report-generated",
        ] {
            assert!(engine.is_condition_met(condition), "{condition} not set");
        }
    }

    #[test]
    fn release_train_needs_its_catalog() {
        let sample = Sample::ReleaseTrain;

        // With the sample catalog everything completes.
        let mut engine = Engine::new(
            sample.playbook().unwrap(),
            Box::new(sample.catalog().unwrap()),
            Arc::new(SimulatedHandler::instant()),
        );
        let summary = driver::run_to_end(&mut engine, |_, _| {}).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Complete);

        // Without it, test-runner produces `test-runner-completed` and publish never unblocks.
        let mut bare = Engine::new(
            sample.playbook().unwrap(),
            Box::new(agentic_catalog::AgentCatalog::builtin()),
            Arc::new(SimulatedHandler::instant()),
        );
        let summary = driver::run_to_end(&mut bare, |_, _| {}).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Stalled);
        assert_eq!(
            bare.step(StepLocation::new(2, 0)).unwrap().status,
            StepStatus::Pending
        );
    }

    #[test]
    fn scripted_failure_with_timeout_budget() {
        let sample = Sample::CustomerOnboarding;
        let handler = ScriptedHandler::new(Arc::new(SimulatedHandler::instant()))
            .fail("data-validator", "schema mismatch");
        let mut engine = Engine::new(
            sample.playbook().unwrap(),
            Box::new(sample.catalog().unwrap()),
            Arc::new(handler),
        )
        .with_step_timeout(Duration::from_secs(5));

        engine.execute_step(0, 0).unwrap();
        let err = engine.execute_step(0, 1).unwrap_err();
        assert!(matches!(err, AgenticError::StepFailed { .. }));
        assert!(engine.is_stalled());
        assert_eq!(engine.progress(), (1, 5));
    }
}
