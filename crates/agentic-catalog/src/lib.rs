//! # agentic-catalog
//!
//! The agent catalog: which condition each agent produces when its step
//! completes.
//!
//! ## Overview
//!
//! This crate provides [`AgentCatalog`], which implements the
//! [`CompletionConditions`](agentic_core::traits::CompletionConditions)
//! trait. The built-in catalog covers the stock agents; TOML files extend or
//! override it. Unknown agents produce `"<agent>-completed"`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use agentic_catalog::AgentCatalog;
//!
//! let catalog = AgentCatalog::builtin().merge(AgentCatalog::from_file(Path::new("agents.toml"))?);
//! // Pass `catalog` to `agentic_core::Engine::new(...)`.
//! ```

pub mod catalog;
pub mod entry;

pub use catalog::{AgentCatalog, BUILTIN_AGENTS, FALLBACK_SUFFIX};
pub use entry::{AgentEntry, CatalogConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use agentic_contracts::error::AgenticError;
    use agentic_core::traits::CompletionConditions;

    use crate::{AgentCatalog, AgentEntry};

    // ── 1. built-ins ──────────────────────────────────────────────────────────

    #[test]
    fn builtin_maps_stock_agents() {
        let catalog = AgentCatalog::builtin();

        assert_eq!(catalog.completion_condition("data-collector"), "data-collected");
        assert_eq!(catalog.completion_condition("data-validator"), "data-validated");
        assert_eq!(catalog.completion_condition("email-sender"), "email-sent");
        assert_eq!(catalog.completion_condition("tracker"), "tracking-active");
        assert_eq!(catalog.completion_condition("reporter"), "report-generated");
        assert_eq!(catalog.len(), 5);
    }

    // ── 2. fallback ───────────────────────────────────────────────────────────

    #[test]
    fn unknown_agent_falls_back_to_completed_suffix() {
        let catalog = AgentCatalog::builtin();
        assert_eq!(
            catalog.completion_condition("custom-agent"),
            "custom-agent-completed"
        );
        assert_eq!(AgentCatalog::empty().completion_condition("tracker"), "tracker-completed");
    }

    /// Lookup is exact.
    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = AgentCatalog::builtin();
        assert_eq!(catalog.completion_condition("Tracker"), "Tracker-completed");
    }

    // ── 3. TOML ───────────────────────────────────────────────────────────────

    #[test]
    fn toml_adds_new_agents() {
        let toml = r#"
            [[agents]]
            name = "invoice-parser"
            produces = "invoice-parsed"
            description = "Extracts line items"

            [[agents]]
            name = "ledger-writer"
            produces = "ledger-updated"
        "#;

        let catalog = AgentCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.completion_condition("invoice-parser"), "invoice-parsed");
        assert_eq!(catalog.completion_condition("ledger-writer"), "ledger-updated");
        assert_eq!(
            catalog.get("invoice-parser").unwrap().description.as_deref(),
            Some("Extracts line items")
        );
    }

    #[test]
    fn merged_toml_overrides_builtin() {
        let toml = r#"
            [[agents]]
            name = "reporter"
            produces = "weekly-report-ready"
        "#;

        let catalog = AgentCatalog::builtin().merge(AgentCatalog::from_toml_str(toml).unwrap());
        assert_eq!(catalog.completion_condition("reporter"), "weekly-report-ready");
        assert_eq!(catalog.completion_condition("tracker"), "tracking-active");
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn duplicate_entries_last_wins() {
        let toml = r#"
            [[agents]]
            name = "a"
            produces = "first"

            [[agents]]
            name = "a"
            produces = "second"
        "#;
        let catalog = AgentCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.completion_condition("a"), "second");
    }

    #[test]
    fn empty_toml_is_an_empty_catalog() {
        let catalog = AgentCatalog::from_toml_str("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = config_reason(AgentCatalog::from_toml_str("[[agents]\nname = 1"));
        assert!(err.contains("failed to parse agent catalog TOML"), "got: {err}");
    }

    #[test]
    fn empty_produces_is_rejected() {
        let toml = r#"
            [[agents]]
            name = "blank"
            produces = "  "
        "#;
        let err = config_reason(AgentCatalog::from_toml_str(toml));
        assert!(err.contains("blank"), "got: {err}");
    }

    #[test]
    fn from_file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.toml");
        std::fs::write(&path, "[[agents]]\nname = \"x\"\nproduces = \"y\"\n").unwrap();

        let catalog = AgentCatalog::from_file(&path).unwrap();
        assert_eq!(catalog.completion_condition("x"), "y");

        let err = config_reason(AgentCatalog::from_file(&dir.path().join("missing.toml")));
        assert!(err.contains("missing.toml"), "got: {err}");
    }

    #[test]
    fn overrides_file_layers_on_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.toml");
        std::fs::write(&path, "[[agents]]\nname = \"tracker\"\nproduces = \"tracked\"\n").unwrap();

        let catalog = AgentCatalog::builtin_with_overrides(Some(&path)).unwrap();
        assert_eq!(catalog.completion_condition("tracker"), "tracked");
        assert_eq!(catalog.completion_condition("reporter"), "report-generated");
        assert_eq!(catalog.len(), 5);

        let plain = AgentCatalog::builtin_with_overrides(None).unwrap();
        assert_eq!(plain.completion_condition("tracker"), "tracking-active");

        let err = config_reason(AgentCatalog::builtin_with_overrides(Some(
            &dir.path().join("absent.toml"),
        )));
        assert!(err.contains("absent.toml"), "got: {err}");
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let mut catalog = AgentCatalog::empty();
        catalog.register(AgentEntry::new("zeta", "z"));
        catalog.register(AgentEntry::new("alpha", "a"));
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    /// Unwraps the `Config` reason out of a failed catalog load.
    fn config_reason(result: Result<AgentCatalog, AgenticError>) -> String {
        match result {
            Err(AgenticError::Config { reason }) => reason,
            Err(other) => panic!("expected Config, got {:?}", other),
            Ok(_) => panic!("expected an error"),
        }
    }
}
