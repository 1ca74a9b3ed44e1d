//! The condition set: named boolean facts scoped to one execution.

use std::collections::HashMap;

/// Built-in bootstrap condition. Always satisfied, never stored.
pub const START_CONDITION: &str = "start";

/// Mapping from condition name to "satisfied".
///
/// Absent entries read as not yet satisfied. Conditions are only ever set to
/// true by the engine, but `set` itself overwrites whatever is there.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    inner: HashMap<String, bool>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_met(&self, name: &str) -> bool {
        if name == START_CONDITION {
            return true;
        }
        self.inner.get(name).copied().unwrap_or(false)
    }

    /// Overwrite the entry for `name`. Writes to `start` are ignored.
    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        let name = name.into();
        if name == START_CONDITION {
            return;
        }
        self.inner.insert(name, value);
    }

    /// Names of every condition currently true, sorted.
    pub fn satisfied(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .inner
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
