//! TOML-configurable agent catalog.
//!
//! `AgentCatalog` implements `CompletionConditions` from agentic-core.
//!
//! Lookup algorithm:
//!
//! 1. If the agent has an entry, return its `produces` condition.
//! 2. Otherwise return `"<agent>-completed"`.
//!
//! The built-in catalog knows the five stock agents. A TOML file can add
//! agents or override built-ins without touching engine code.

use std::{collections::HashMap, path::Path};

use tracing::{debug, info};

use agentic_contracts::error::{AgenticError, AgenticResult};
use agentic_core::traits::CompletionConditions;

use crate::entry::{AgentEntry, CatalogConfig};

/// Suffix appended to unknown agent names.
pub const FALLBACK_SUFFIX: &str = "-completed";

/// The stock agents and the conditions they produce.
pub const BUILTIN_AGENTS: [(&str, &str); 5] = [
    ("data-collector", "data-collected"),
    ("data-validator", "data-validated"),
    ("email-sender", "email-sent"),
    ("tracker", "tracking-active"),
    ("reporter", "report-generated"),
];

/// Agent name → produced condition.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    entries: HashMap<String, AgentEntry>,
}

impl AgentCatalog {
    /// A catalog with no entries: every agent falls back to `<agent>-completed`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The five stock agents.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (name, produces) in BUILTIN_AGENTS {
            catalog.register(AgentEntry::new(name, produces));
        }
        catalog
    }

    /// Parse `s` as TOML and build a catalog containing only its entries.
    ///
    /// Returns `AgenticError::Config` if the TOML is malformed, does not
    /// match `CatalogConfig`, or contains an entry with an empty name or
    /// empty `produces`.
    pub fn from_toml_str(s: &str) -> AgenticResult<Self> {
        let config: CatalogConfig = toml::from_str(s).map_err(|e| AgenticError::Config {
            reason: format!("failed to parse agent catalog TOML: {}", e),
        })?;

        let mut catalog = Self::empty();
        for entry in config.agents {
            if entry.name.trim().is_empty() || entry.produces.trim().is_empty() {
                return Err(AgenticError::Config {
                    reason: format!(
                        "catalog entry '{}' must have a non-empty name and produces",
                        entry.name
                    ),
                });
            }
            catalog.register(entry);
        }
        Ok(catalog)
    }

    /// Read the file at `path` and parse it as a TOML catalog.
    pub fn from_file(path: &Path) -> AgenticResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AgenticError::Config {
            reason: format!("failed to read agent catalog '{}': {}", path.display(), e),
        })?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), agents = catalog.len(), "agent catalog loaded");
        Ok(catalog)
    }

    /// The built-in agents, overridden by the catalog file at `path` when given.
    pub fn builtin_with_overrides(path: Option<&Path>) -> AgenticResult<Self> {
        let builtin = Self::builtin();
        match path {
            Some(path) => Ok(builtin.merge(Self::from_file(path)?)),
            None => Ok(builtin),
        }
    }

    /// Add or replace an entry.
    pub fn register(&mut self, entry: AgentEntry) {
        if let Some(previous) = self.entries.insert(entry.name.clone(), entry) {
            debug!(agent = %previous.name, "catalog entry replaced");
        }
    }

    /// Layer `other` on top of `self`; its entries win on conflict.
    pub fn merge(mut self, other: AgentCatalog) -> Self {
        for (_, entry) in other.entries {
            self.register(entry);
        }
        self
    }

    pub fn get(&self, agent: &str) -> Option<&AgentEntry> {
        self.entries.get(agent)
    }

    /// All entries, sorted by agent name.
    pub fn entries(&self) -> Vec<&AgentEntry> {
        let mut entries: Vec<&AgentEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompletionConditions for AgentCatalog {
    fn completion_condition(&self, agent: &str) -> String {
        match self.entries.get(agent) {
            Some(entry) => entry.produces.clone(),
            None => format!("{}{}", agent, FALLBACK_SUFFIX),
        }
    }
}
