//! Inventory bookkeeping, borrowed from the reconciler's point of view.
//!
//! The evaluator is pure and knows nothing about inventories — this is the
//! data shape an external reconciler (out of scope, see spec.md §1) would
//! use to track what it created from a previous `Eval`, so it can prune
//! anything that no longer appears. `Inventory::record` is provided as a
//! pure convenience for building one; nothing here watches or reconciles.

use serde::{Deserialize, Serialize};

/// A flattened reference to an emitted object: enough to find and delete it
/// later without re-deriving a `GroupVersionKind` from a typed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub namespaced_name: String,
    pub group_version: String,
    pub kind: String,
}

/// The set of objects a reconciler created from one `Eval` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub entries: Vec<ObjectRef>,
}

impl Inventory {
    pub fn record(&mut self, namespaced_name: impl Into<String>, group_version: impl Into<String>, kind: impl Into<String>) {
        self.entries.push(ObjectRef {
            namespaced_name: namespaced_name.into(),
            group_version: group_version.into(),
            kind: kind.into(),
        });
    }

    /// Entries present in `self` but absent from `current` — what a
    /// reconciler should prune on this pass.
    pub fn stale_against<'a>(&'a self, current: &Inventory) -> Vec<&'a ObjectRef> {
        self.entries.iter().filter(|entry| !current.entries.contains(entry)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_entries_in_order() {
        let mut inv = Inventory::default();
        inv.record("default/a", "v1", "ConfigMap");
        inv.record("default/b", "v1", "ConfigMap");
        assert_eq!(inv.entries.len(), 2);
        assert_eq!(inv.entries[0].namespaced_name, "default/a");
    }

    #[test]
    fn stale_against_finds_removed_entries() {
        let mut previous = Inventory::default();
        previous.record("default/a", "v1", "ConfigMap");
        previous.record("default/b", "v1", "ConfigMap");

        let mut current = Inventory::default();
        current.record("default/b", "v1", "ConfigMap");

        let stale = previous.stale_against(&current);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].namespaced_name, "default/a");
    }
}
