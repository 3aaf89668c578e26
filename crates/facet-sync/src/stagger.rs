//! Per-group arrival indices used to stagger commit times.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use indexmap::IndexSet;

/// Assigns each field a fixed index within its coordination group.
///
/// The first field seen in a group gets 0, the next distinct field 1, and
/// so on. Indices are never released or reassigned, so a registry lives as
/// long as the application that created it. Construct one at startup and
/// share it (`Arc`) with every coordinator; tests build their own.
#[derive(Debug, Default)]
pub struct StaggerRegistry {
    groups: Mutex<HashMap<String, IndexSet<String>>>,
}

impl StaggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `field_key` in `group_id`, registering it on first sight.
    pub fn offset_index_for(&self, group_id: &str, field_key: &str) -> usize {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        let members = groups.entry(group_id.to_string()).or_default();
        if let Some(index) = members.get_index_of(field_key) {
            return index;
        }
        let (index, _) = members.insert_full(field_key.to_string());
        tracing::debug!(group = group_id, key = field_key, index, "registered stagger slot");
        index
    }

    /// Members of `group_id` in arrival order.
    pub fn members(&self, group_id: &str) -> Vec<String> {
        let groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        groups
            .get(group_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn group_count(&self) -> usize {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_arrival_order() {
        let registry = StaggerRegistry::new();
        assert_eq!(registry.offset_index_for("sort", "price"), 0);
        assert_eq!(registry.offset_index_for("sort", "title"), 1);
        assert_eq!(registry.offset_index_for("sort", "popularity"), 2);

        // Later lookups never move a field.
        assert_eq!(registry.offset_index_for("sort", "popularity"), 2);
        assert_eq!(registry.offset_index_for("sort", "price"), 0);
    }

    #[test]
    fn groups_are_independent() {
        let registry = StaggerRegistry::new();
        registry.offset_index_for("catalog", "a");
        assert_eq!(registry.offset_index_for("admin", "b"), 0);
        assert_eq!(registry.group_count(), 2);
        assert_eq!(registry.members("catalog"), vec!["a".to_string()]);
        assert!(registry.members("missing").is_empty());
    }
}
