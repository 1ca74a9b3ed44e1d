//! Catalog entry types and configuration schema.
//!
//! A `CatalogConfig` is deserialized from TOML and holds a list of
//! `AgentEntry`s, each naming the condition an agent produces on success.

use serde::{Deserialize, Serialize};

/// One agent and the condition its steps set when they complete.
///
/// Example in TOML:
/// ```toml
/// [[agents]]
/// name = "invoice-parser"
/// produces = "invoice-parsed"
/// description = "Extracts line items from uploaded invoices"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Agent name as it appears in `steps[].agent`.
    pub name: String,

    /// Condition set to true when a step run by this agent completes.
    pub produces: String,

    /// Human-readable note for operators. Not used for scheduling.
    #[serde(default)]
    pub description: Option<String>,
}

impl AgentEntry {
    pub fn new(name: impl Into<String>, produces: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            produces: produces.into(),
            description: None,
        }
    }
}

/// The top-level structure deserialized from a TOML catalog file.
///
/// Later entries with the same `name` replace earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}
