//! agentic-tui: interactive playbook runner.
//!
//! Layout:
//!   ┌─── title ───────────────────────────────────────────────────────────┐
//!   │  <playbook name>                                                    │
//!   ├─── controls ────────────────────────────────────────────────────────┤
//!   │  Press SPACE to execute next steps, 'q' to quit                     │
//!   ├─── one panel per branch ────────────────────────────────────────────┤
//!   │  ✓ data-collector: Collect ... (condition: start)                   │
//!   │  ○ data-validator: Validate ... (condition: data-collected)         │
//!   ├─── Recent Activity ─────────────────────────────────────────────────┤
//!   │  • ✓ Data Processing: data-collector completed                      │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//! The engine runs on a worker thread. The UI keeps its own copy of the
//! playbook and replays journal transitions onto it, so a step shows as
//! running while its handler is still working.

use std::{
    collections::VecDeque,
    io,
    path::PathBuf,
    sync::{
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};

use agentic_catalog::AgentCatalog;
use agentic_contracts::{
    error::AgenticResult,
    execution::RunId,
    playbook::{Playbook, Step, StepStatus},
    work::CancellationToken,
};
use agentic_core::{
    driver::{self, DriveEvent, RunOutcome},
    Engine,
};
use agentic_handlers::SimulatedHandler;
use agentic_journal::{InMemoryJournal, JournalEntry};

/// Activity lines kept in memory.
const MAX_LOGS: usize = 20;
/// Activity lines shown.
const VISIBLE_LOGS: usize = 5;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agentic-tui", about = "Step through a playbook interactively")]
struct Cli {
    /// Playbook YAML file.
    #[arg(short = 'c', long = "config", default_value = "playbook.yaml")]
    config: PathBuf,

    /// TOML agent catalog. Entries override the built-in agents.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Simulated work per step, in milliseconds.
    #[arg(long, default_value_t = 500)]
    work_ms: u64,

    /// Fail any step still running after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// What the worker thread reports back.
enum WorkerMessage {
    Activity(String),
    Finished(AgenticResult<RunOutcome>),
}

fn activity_line(event: &DriveEvent) -> Option<String> {
    match event {
        DriveEvent::Executed(report) => {
            Some(format!("✓ {}: {} completed", report.branch, report.agent))
        }
        DriveEvent::StepFailed { error, .. } => Some(format!("✗ Error: {}", error)),
        DriveEvent::Complete => Some("🎉 Playbook execution completed!".to_string()),
        DriveEvent::Stalled => Some("No executable steps remain.".to_string()),
    }
}

/// Drive `engine` to the end on its own thread.
fn spawn_worker(mut engine: Engine) -> (Receiver<WorkerMessage>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let result = driver::run_to_end(&mut engine, |_, event| {
            if let Some(line) = activity_line(event) {
                let _ = tx.send(WorkerMessage::Activity(line));
            }
        });
        let _ = tx.send(WorkerMessage::Finished(result.map(|summary| summary.outcome)));
    });
    (rx, handle)
}

// ── App state ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Executing,
    Done(RunOutcome),
    Aborted,
}

struct App {
    /// Display copy. Statuses come from the journal, never from the engine.
    playbook: Playbook,
    journal: InMemoryJournal,
    /// Journal entries already applied to `playbook`.
    applied: usize,
    logs: VecDeque<String>,
    phase: Phase,

    // Present until SPACE hands the engine to the worker.
    engine: Option<Engine>,
    cancel: CancellationToken,
    worker: Option<(Receiver<WorkerMessage>, JoinHandle<()>)>,
}

impl App {
    fn new(engine: Engine, journal: InMemoryJournal, cancel: CancellationToken) -> Self {
        Self {
            playbook: engine.playbook().clone(),
            journal,
            applied: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            phase: Phase::Ready,
            engine: Some(engine),
            cancel,
            worker: None,
        }
    }

    fn add_log(&mut self, message: impl Into<String>) {
        self.logs.push_back(message.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Start executing. A no-op once started.
    fn start(&mut self) {
        if let Some(engine) = self.engine.take() {
            self.worker = Some(spawn_worker(engine));
            self.phase = Phase::Executing;
        }
    }

    /// Pull new journal entries and worker messages.
    fn tick(&mut self) {
        let fresh = self.journal.since(self.applied);
        self.apply(&fresh);

        let mut finished = None;
        if let Some((rx, _)) = &self.worker {
            loop {
                match rx.try_recv() {
                    Ok(WorkerMessage::Activity(line)) => self.logs.push_back(line),
                    Ok(WorkerMessage::Finished(result)) => {
                        finished = Some(result);
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        finished = Some(Ok(RunOutcome::Cancelled));
                        break;
                    }
                }
            }
        }
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }

        if let Some(result) = finished {
            self.finish(result);
        }
    }

    fn apply(&mut self, entries: &[JournalEntry]) {
        for entry in entries {
            let t = &entry.transition;
            if let Some(step) = self.playbook.step_mut(t.location) {
                step.status = t.to;
            }
        }
        self.applied += entries.len();
    }

    fn finish(&mut self, result: AgenticResult<RunOutcome>) {
        if let Some((_, handle)) = self.worker.take() {
            let _ = handle.join();
        }
        // The worker may have journaled after our last poll.
        let rest = self.journal.since(self.applied);
        self.apply(&rest);

        self.phase = match result {
            Ok(outcome) => Phase::Done(outcome),
            Err(e) => {
                self.add_log(format!("✗ Error: {}", e));
                Phase::Aborted
            }
        };
    }

    /// Cancel the run and wait for the in-flight step to notice.
    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some((_, handle)) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn controls(&self) -> &'static str {
        match self.phase {
            Phase::Ready => "Press SPACE to execute next steps, 'q' to quit",
            Phase::Executing => "Executing...",
            Phase::Done(RunOutcome::Complete) => "Execution complete!",
            Phase::Done(_) => "Execution stopped: no executable steps remain. 'q' to quit",
            Phase::Aborted => "Execution aborted. 'q' to quit",
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn ui(f: &mut Frame, app: &App) {
    let full = f.area();

    let mut constraints = vec![
        Constraint::Length(3), // title
        Constraint::Length(1), // controls
    ];
    for branch in &app.playbook.branches {
        constraints.push(Constraint::Length(branch.steps.len() as u16 + 2));
    }
    constraints.push(Constraint::Length(VISIBLE_LOGS as u16 + 2)); // activity
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(full);

    render_title(f, chunks[0], app);
    render_controls(f, chunks[1], app);
    for (i, branch) in app.playbook.branches.iter().enumerate() {
        render_branch(f, chunks[2 + i], &branch.name, &branch.steps);
    }
    render_activity(f, chunks[2 + app.playbook.branches.len()], app);
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let title = Paragraph::new(Line::from(Span::styled(
        app.playbook.name.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(title, area);
}

fn render_controls(f: &mut Frame, area: Rect, app: &App) {
    let color = match app.phase {
        Phase::Ready => Color::Gray,
        Phase::Executing => Color::Yellow,
        Phase::Done(RunOutcome::Complete) => Color::Green,
        Phase::Done(_) | Phase::Aborted => Color::Red,
    };
    let controls = Paragraph::new(Line::from(Span::styled(
        format!(" {}", app.controls()),
        Style::default().fg(color),
    )));
    f.render_widget(controls, area);
}

fn status_style(status: StepStatus) -> (&'static str, Style) {
    match status {
        StepStatus::Completed => ("✓", Style::default().fg(Color::Green)),
        StepStatus::Running => (
            "⟳",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        StepStatus::Failed => ("✗", Style::default().fg(Color::Red)),
        StepStatus::Pending => ("○", Style::default().fg(Color::Gray)),
    }
}

fn step_line(step: &Step) -> String {
    let (icon, _) = status_style(step.status);
    format!(
        "{} {}: {} (condition: {})",
        icon, step.agent, step.action, step.condition
    )
}

fn render_branch(f: &mut Frame, area: Rect, name: &str, steps: &[Step]) {
    let items: Vec<ListItem> = steps
        .iter()
        .map(|step| {
            let (_, style) = status_style(step.status);
            ListItem::new(Line::from(Span::styled(step_line(step), style)))
        })
        .collect();

    let block = Block::default()
        .title(format!(" {} ", name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    f.render_widget(List::new(items).block(block), area);
}

fn render_activity(f: &mut Frame, area: Rect, app: &App) {
    let start = app.logs.len().saturating_sub(VISIBLE_LOGS);
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .skip(start)
        .map(|line| ListItem::new(format!("• {}", line)))
        .collect();

    let block = Block::default()
        .title(" Recent Activity ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(List::new(items).block(block), area);
}

// ── Loading ───────────────────────────────────────────────────────────────────

fn load(cli: &Cli) -> AgenticResult<App> {
    let playbook = Playbook::from_file(&cli.config)?;
    let catalog = AgentCatalog::builtin_with_overrides(cli.catalog.as_deref())?;

    let run_id = RunId::new();
    let journal = InMemoryJournal::new(run_id.to_string());
    let cancel = CancellationToken::new();

    let mut engine = Engine::new(
        playbook,
        Box::new(catalog),
        Arc::new(SimulatedHandler::new(Duration::from_millis(cli.work_ms))),
    )
    .with_run_id(run_id)
    .with_journal(Box::new(journal.clone()))
    .with_cancellation(cancel.clone());
    if let Some(ms) = cli.timeout_ms {
        engine = engine.with_step_timeout(Duration::from_millis(ms));
    }

    Ok(App::new(engine, journal, cancel))
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    // Load before touching the terminal so errors print normally.
    let mut app = match load(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    const TICK_MS: u64 = 100;

    loop {
        app.tick();
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(TICK_MS))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char(' ') | KeyCode::Enter => app.start(),
                    _ => {}
                }
            }
        }
    }

    app.shutdown();
    restore_terminal(&mut terminal)?;
    Ok(())
}
