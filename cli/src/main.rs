//! agentic: headless playbook runner.
//!
//! Loads a YAML playbook, executes every reachable step with simulated work
//! and prints progress as it goes.
//!
//! Usage:
//!   cargo run -p agentic-cli -- -c playbook.yaml
//!   cargo run -p agentic-cli -- run -c playbook.yaml --fail-agent email-sender
//!   cargo run -p agentic-cli -- plan -c playbook.yaml --catalog agents.toml
//!   cargo run -p agentic-cli -- sample customer-onboarding > playbook.yaml

use std::{
    fmt::Write as _,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentic_catalog::AgentCatalog;
use agentic_contracts::{
    error::{AgenticError, AgenticResult},
    execution::RunId,
    playbook::Playbook,
};
use agentic_core::{
    driver::{self, DriveEvent, RunOutcome},
    traits::StepHandler,
    Engine,
};
use agentic_handlers::{Sample, ScriptedHandler, SimulatedHandler};
use agentic_journal::InMemoryJournal;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Condition-driven playbook runner.
///
/// Without a subcommand, behaves like `run`.
#[derive(Parser, Debug)]
#[command(
    name = "agentic",
    about = "Run condition-driven agent playbooks",
    long_about = "Executes playbook steps as their trigger conditions become true.\n\
                  Each completed step raises the condition its agent produces,\n\
                  which may unblock steps in any branch.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute the playbook until it completes or nothing more can run.
    Run(RunArgs),
    /// Show branches, steps, produced conditions and the initial ready set.
    Plan(SourceArgs),
    /// Print an embedded sample playbook.
    Sample {
        /// Sample name.
        #[arg(default_value = "customer-onboarding")]
        name: String,
        /// List sample names instead.
        #[arg(long)]
        list: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Playbook YAML file.
    #[arg(short = 'c', long = "config", default_value = "playbook.yaml")]
    config: PathBuf,

    /// TOML agent catalog. Entries override the built-in agents.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Simulated work per step, in milliseconds.
    #[arg(long, default_value_t = 500)]
    work_ms: u64,

    /// Fail any step still running after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Make every step run by this agent fail. Repeatable.
    #[arg(long = "fail-agent", value_name = "AGENT")]
    fail_agents: Vec<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Run(args)) => run(&args),
        None => run(&cli.run),
        Some(Command::Plan(source)) => plan(&source),
        Some(Command::Sample { name, list }) => sample(&name, list),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

fn build_handler(args: &RunArgs) -> Arc<dyn StepHandler> {
    let simulated: Arc<dyn StepHandler> =
        Arc::new(SimulatedHandler::new(Duration::from_millis(args.work_ms)));
    if args.fail_agents.is_empty() {
        return simulated;
    }
    let scripted = args
        .fail_agents
        .iter()
        .fold(ScriptedHandler::new(simulated), |handler, agent| {
            handler.fail(agent.clone(), "scripted failure (--fail-agent)")
        });
    Arc::new(scripted)
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// Returns `Ok(true)` when every step completed.
fn run(args: &RunArgs) -> AgenticResult<bool> {
    let playbook = Playbook::from_file(&args.source.config)?;
    let catalog = AgentCatalog::builtin_with_overrides(args.source.catalog.as_deref())?;

    let run_id = RunId::new();
    let journal = InMemoryJournal::new(run_id.to_string());

    let mut engine = Engine::new(playbook, Box::new(catalog), build_handler(args))
        .with_run_id(run_id)
        .with_journal(Box::new(journal.clone()));
    if let Some(ms) = args.timeout_ms {
        engine = engine.with_step_timeout(Duration::from_millis(ms));
    }

    info!(run_id = %run_id, config = %args.source.config.display(), "starting run");

    let (_, total) = engine.progress();
    println!(
        "Playbook: {} ({} branches, {} steps)",
        engine.playbook().name,
        engine.playbook().branches.len(),
        total
    );
    println!();

    let summary = driver::run_to_end(&mut engine, |engine, event| {
        if let Some(line) = event_line(engine, event) {
            println!("{}", line);
        }
    })?;

    let (completed, total) = engine.progress();
    println!();
    println!("Completed {}/{} steps, {} failed.", completed, total, summary.failed);
    println!(
        "Journal: {} transitions, chain {}.",
        journal.len(),
        if journal.verify_integrity() { "intact" } else { "BROKEN" }
    );

    Ok(summary.outcome == RunOutcome::Complete)
}

fn plan(source: &SourceArgs) -> AgenticResult<bool> {
    let playbook = Playbook::from_file(&source.config)?;
    let catalog = AgentCatalog::builtin_with_overrides(source.catalog.as_deref())?;
    let engine = Engine::new(playbook, Box::new(catalog), Arc::new(SimulatedHandler::instant()));
    print!("{}", render_plan(&engine));
    Ok(true)
}

fn sample(name: &str, list: bool) -> AgenticResult<bool> {
    if list {
        for sample in Sample::ALL {
            println!("{}", sample.name());
        }
        return Ok(true);
    }
    let sample = Sample::from_name(name).ok_or_else(|| AgenticError::Config {
        reason: format!("unknown sample '{}' (try --list)", name),
    })?;
    print!("{}", sample.yaml());
    Ok(true)
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// One progress line per driver event.
fn event_line(engine: &Engine, event: &DriveEvent) -> Option<String> {
    match event {
        DriveEvent::Executed(report) => {
            Some(format!("✓ {}: {} completed", report.branch, report.agent))
        }
        DriveEvent::StepFailed { error, .. } => Some(format!("✗ Error: {}", error)),
        DriveEvent::Complete => Some("🎉 Playbook execution completed!".to_string()),
        DriveEvent::Stalled => {
            let failed = engine.failed_steps().len();
            if failed > 0 {
                Some(format!("No executable steps remain ({} failed).", failed))
            } else {
                Some("No executable steps remain; some conditions are never produced.".to_string())
            }
        }
    }
}

fn render_plan(engine: &Engine) -> String {
    let playbook = engine.playbook();
    let mut out = String::new();

    let _ = writeln!(out, "Playbook: {}", playbook.name);
    for (b, branch) in playbook.branches.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Branch {}: {}", b, branch.name);
        for step in &branch.steps {
            let _ = writeln!(
                out,
                "  {}: {} (condition: {}) -> {}",
                step.agent,
                step.action,
                step.condition,
                engine.completion_condition_for(step)
            );
        }
    }

    let ready = engine.next_executable_steps();
    let _ = writeln!(out);
    if ready.is_empty() {
        let _ = writeln!(out, "Ready now: nothing");
    } else {
        let _ = writeln!(out, "Ready now:");
        for location in ready {
            if let Some(step) = engine.step(location) {
                let _ = writeln!(out, "  {} {}", location, step.agent);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use agentic_contracts::playbook::{Branch, Step};

    use super::*;

    // ── Argument parsing ──────────────────────────────────────────────────────

    #[test]
    fn bare_invocation_runs_default_playbook() {
        let cli = Cli::try_parse_from(["agentic"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.source.config, PathBuf::from("playbook.yaml"));
        assert_eq!(cli.run.work_ms, 500);
        assert!(cli.run.timeout_ms.is_none());
        assert!(cli.run.fail_agents.is_empty());
    }

    #[test]
    fn run_subcommand_accepts_repeated_fail_agent() {
        let cli = Cli::try_parse_from([
            "agentic", "run", "-c", "flow.yaml", "--timeout-ms", "50",
            "--fail-agent", "tracker", "--fail-agent", "reporter",
        ])
        .unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.source.config, PathBuf::from("flow.yaml"));
        assert_eq!(args.timeout_ms, Some(50));
        assert_eq!(args.fail_agents, vec!["tracker", "reporter"]);
    }

    #[test]
    fn sample_defaults_to_onboarding() {
        let cli = Cli::try_parse_from(["agentic", "sample"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Sample { ref name, list: false }) if name == "customer-onboarding"
        ));
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[test]
    fn run_with_missing_catalog_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(Sample::CustomerOnboarding.yaml().as_bytes()).unwrap();

        let args = RunArgs {
            source: SourceArgs {
                config: file.path().to_path_buf(),
                catalog: Some(PathBuf::from("/definitely/not/here.toml")),
            },
            work_ms: 0,
            timeout_ms: None,
            fail_agents: vec![],
        };
        assert!(matches!(run(&args), Err(AgenticError::Config { .. })));
    }

    #[test]
    fn run_reports_completion_for_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(Sample::CustomerOnboarding.yaml().as_bytes()).unwrap();

        let args = RunArgs {
            source: SourceArgs { config: file.path().to_path_buf(), catalog: None },
            work_ms: 0,
            timeout_ms: None,
            fail_agents: vec![],
        };
        assert!(run(&args).unwrap());

        let failing = RunArgs { fail_agents: vec!["tracker".to_string()], ..args };
        assert!(!run(&failing).unwrap());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn plan_lists_steps_and_ready_set() {
        let playbook = Playbook::new(
            "tiny",
            vec![Branch::new(
                "only",
                vec![
                    Step::new("data-collector", "start", "collect"),
                    Step::new("archiver", "data-collected", "archive"),
                ],
            )],
        );
        let engine = Engine::new(
            playbook,
            Box::new(AgentCatalog::builtin()),
            Arc::new(SimulatedHandler::instant()),
        );

        let text = render_plan(&engine);
        assert!(text.contains("Branch 0: only"));
        assert!(text.contains("data-collector: collect (condition: start) -> data-collected"));
        assert!(text.contains("archiver: archive (condition: data-collected) -> archiver-completed"));
        assert!(text.contains("Ready now:\n  (0,0) data-collector"));
    }

    #[test]
    fn stalled_line_mentions_failures() {
        let playbook = Playbook::new(
            "stuck",
            vec![Branch::new("x", vec![Step::new("z", "never", "")])],
        );
        let engine = Engine::new(
            playbook,
            Box::new(AgentCatalog::builtin()),
            Arc::new(SimulatedHandler::instant()),
        );
        let line = event_line(&engine, &DriveEvent::Stalled).unwrap();
        assert!(line.contains("never produced"));
    }
}
