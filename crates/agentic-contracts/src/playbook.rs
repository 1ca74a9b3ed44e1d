//! Playbook model: branches, steps and per-step status.
//!
//! A `Playbook` is built once from a YAML document and its shape never
//! changes afterwards. Only the `status` field of each `Step` is mutated, and
//! only by the engine.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{AgenticError, AgenticResult};

/// Lifecycle of a single step.
///
/// `Pending → Running → Completed` on success, `Pending → Running → Failed`
/// when the step's work fails, times out or is cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    /// True for `Completed` and `Failed`; neither ever changes again.
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural coordinate of a step: `(branch index, step index)`.
///
/// Steps have no identity beyond this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepLocation {
    pub branch_index: usize,
    pub step_index: usize,
}

impl StepLocation {
    pub fn new(branch_index: usize, step_index: usize) -> Self {
        Self { branch_index, step_index }
    }
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.branch_index, self.step_index)
    }
}

/// One unit of work: performed by `agent`, gated by `condition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Which handler performs the action, e.g. "data-collector".
    #[serde(default)]
    pub agent: String,
    /// Name of the condition that must be satisfied before this step may run.
    /// Missing means empty, which is never met.
    #[serde(default)]
    pub condition: String,
    /// Free-text description of the work.
    #[serde(default)]
    pub action: String,
    /// Never read from input; every parsed step starts `Pending`.
    #[serde(skip)]
    pub status: StepStatus,
}

impl Step {
    pub fn new(
        agent: impl Into<String>,
        condition: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            condition: condition.into(),
            action: action.into(),
            status: StepStatus::Pending,
        }
    }
}

/// An ordered group of steps. Order only drives scan order, not execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Branch {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self { name: name.into(), steps }
    }
}

/// The full declarative plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// Top-level shape of a playbook document: everything sits under `playbook:`.
#[derive(Debug, Deserialize)]
struct PlaybookDocument {
    #[serde(default)]
    playbook: Playbook,
}

/// Deserialize a playbook document from raw bytes.
///
/// Every step's status is forced to `Pending`: the document is configuration,
/// not resumable state.
pub fn parse(raw: &[u8]) -> AgenticResult<Playbook> {
    let document: PlaybookDocument =
        serde_yaml::from_slice(raw).map_err(|e| AgenticError::Parse {
            reason: format!("failed to parse playbook YAML: {}", e),
        })?;

    let mut playbook = document.playbook;
    for branch in &mut playbook.branches {
        for step in &mut branch.steps {
            step.status = StepStatus::Pending;
        }
    }
    Ok(playbook)
}

impl Playbook {
    pub fn new(name: impl Into<String>, branches: Vec<Branch>) -> Self {
        Self { name: name.into(), branches }
    }

    /// Parse a YAML string. See [`parse`].
    pub fn from_yaml_str(s: &str) -> AgenticResult<Self> {
        parse(s.as_bytes())
    }

    /// Read and parse the playbook document at `path`.
    ///
    /// A missing or unreadable file is a `Config` error; a malformed
    /// document is a `Parse` error.
    pub fn from_file(path: &Path) -> AgenticResult<Self> {
        let raw = std::fs::read(path).map_err(|e| AgenticError::Config {
            reason: format!("failed to read playbook file '{}': {}", path.display(), e),
        })?;
        parse(&raw)
    }

    pub fn step(&self, location: StepLocation) -> Option<&Step> {
        self.branches
            .get(location.branch_index)
            .and_then(|b| b.steps.get(location.step_index))
    }

    pub fn step_mut(&mut self, location: StepLocation) -> Option<&mut Step> {
        self.branches
            .get_mut(location.branch_index)
            .and_then(|b| b.steps.get_mut(location.step_index))
    }

    /// Every step with its location, in branch-then-step order.
    pub fn steps(&self) -> impl Iterator<Item = (StepLocation, &Step)> {
        self.branches.iter().enumerate().flat_map(|(b, branch)| {
            branch
                .steps
                .iter()
                .enumerate()
                .map(move |(s, step)| (StepLocation::new(b, s), step))
        })
    }

    pub fn step_count(&self) -> usize {
        self.branches.iter().map(|b| b.steps.len()).sum()
    }
}
