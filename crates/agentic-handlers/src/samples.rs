//! Embedded sample playbooks.
//!
//! All data is fictional. The YAML lives under `playbooks/` so it can also be
//! passed to the CLI with `--config`.

use agentic_catalog::AgentCatalog;
use agentic_contracts::{error::AgenticResult, playbook::Playbook};

/// Three branches over the five stock agents, chained across branches:
/// collect → validate → email → track → report.
pub const CUSTOMER_ONBOARDING: &str = include_str!("../playbooks/customer-onboarding.yaml");

/// Custom agents only. Needs `RELEASE_AGENTS` for `tests-passed`.
pub const RELEASE_TRAIN: &str = include_str!("../playbooks/release-train.yaml");

/// Catalog entries for `RELEASE_TRAIN`.
pub const RELEASE_AGENTS: &str = include_str!("../playbooks/release-agents.toml");

/// A named sample: playbook document plus the catalog it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    CustomerOnboarding,
    ReleaseTrain,
}

impl Sample {
    pub const ALL: [Sample; 2] = [Sample::CustomerOnboarding, Sample::ReleaseTrain];

    pub fn name(self) -> &'static str {
        match self {
            Sample::CustomerOnboarding => "customer-onboarding",
            Sample::ReleaseTrain => "release-train",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn yaml(self) -> &'static str {
        match self {
            Sample::CustomerOnboarding => CUSTOMER_ONBOARDING,
            Sample::ReleaseTrain => RELEASE_TRAIN,
        }
    }

    pub fn playbook(self) -> AgenticResult<Playbook> {
        Playbook::from_yaml_str(self.yaml())
    }

    /// Built-in agents plus whatever the sample adds.
    pub fn catalog(self) -> AgenticResult<AgentCatalog> {
        match self {
            Sample::CustomerOnboarding => Ok(AgentCatalog::builtin()),
            Sample::ReleaseTrain => {
                Ok(AgentCatalog::builtin().merge(AgentCatalog::from_toml_str(RELEASE_AGENTS)?))
            }
        }
    }
}
