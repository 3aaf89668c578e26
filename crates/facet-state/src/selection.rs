//! Set-valued fields such as tag pickers.

use std::time::Instant;

use facet_model::FieldBinding;
use facet_sync::SyncCoordinator;

use crate::reducer::{Reducer, replace_if_changed};

/// Commands for a [`SelectionSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    /// Append the value unless it is already active.
    Add(String),
    /// Drop the value if it is active.
    Remove(String),
    /// `Add` when absent, `Remove` when present.
    Toggle(String),
    /// Replace the committed half wholesale. Fired by the coordinator.
    Commit(Vec<String>),
    /// Empty the active half. The commit follows through the debounce path.
    Reset,
}

/// An ordered set of active values plus its committed mirror.
///
/// Both halves keep insertion order and never hold duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    active: Vec<String>,
    committed: Vec<String>,
    binding: FieldBinding,
}

impl SelectionSet {
    pub fn new(binding: FieldBinding) -> Self {
        Self::seeded(Vec::new(), binding)
    }

    /// Start with `initial` in both halves.
    pub fn seeded(initial: Vec<String>, binding: FieldBinding) -> Self {
        let initial = dedupe(initial);
        Self {
            active: initial.clone(),
            committed: initial,
            binding,
        }
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn committed(&self) -> &[String] {
        &self.committed
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    pub fn contains(&self, value: &str) -> bool {
        self.active.iter().any(|v| v == value)
    }

    /// A value is in flight while its membership differs between the halves.
    pub fn is_pending(&self, value: &str) -> bool {
        self.contains(value) != self.committed.iter().any(|v| v == value)
    }

    /// Every in-flight value: newly added ones in active order, then removed
    /// ones in committed order.
    pub fn pending_values(&self) -> Vec<&str> {
        let added = self
            .active
            .iter()
            .filter(|v| !self.committed.contains(v));
        let removed = self
            .committed
            .iter()
            .filter(|v| !self.active.contains(v));
        added.chain(removed).map(String::as_str).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_values().is_empty()
    }

    pub fn schedule(
        &self,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> facet_sync::Result<Option<Instant>> {
        coordinator.schedule(now, &self.binding, &self.active, &self.committed)
    }
}

impl Reducer for SelectionSet {
    type Command = SelectionCommand;

    fn dispatch(&mut self, command: SelectionCommand) -> bool {
        match command {
            SelectionCommand::Add(value) => {
                if self.contains(&value) {
                    return false;
                }
                self.active.push(value);
                true
            }
            SelectionCommand::Remove(value) => {
                let before = self.active.len();
                self.active.retain(|v| *v != value);
                self.active.len() != before
            }
            SelectionCommand::Toggle(value) => {
                if self.contains(&value) {
                    self.dispatch(SelectionCommand::Remove(value))
                } else {
                    self.dispatch(SelectionCommand::Add(value))
                }
            }
            SelectionCommand::Commit(values) => replace_if_changed(&mut self.committed, dedupe(values)),
            SelectionCommand::Reset => {
                if self.active.is_empty() {
                    return false;
                }
                self.active.clear();
                true
            }
        }
    }
}

fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> SelectionSet {
        SelectionSet::new(FieldBinding::new("tags"))
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut set = tags();
        assert!(set.dispatch(SelectionCommand::Add("red".into())));
        assert!(set.dispatch(SelectionCommand::Add("blue".into())));
        assert!(!set.dispatch(SelectionCommand::Add("red".into())));
        assert_eq!(set.active(), ["red", "blue"]);
    }

    #[test]
    fn remove_of_absent_value_is_a_no_op() {
        let mut set = tags();
        assert!(!set.dispatch(SelectionCommand::Remove("red".into())));
    }

    #[test]
    fn pending_tracks_membership_difference() {
        let mut set = SelectionSet::seeded(vec!["red".into()], FieldBinding::new("tags"));
        set.dispatch(SelectionCommand::Add("blue".into()));
        set.dispatch(SelectionCommand::Remove("red".into()));

        assert!(set.is_pending("blue"));
        assert!(set.is_pending("red"));
        assert!(!set.is_pending("green"));
        assert_eq!(set.pending_values(), ["blue", "red"]);

        set.dispatch(SelectionCommand::Commit(vec!["blue".into()]));
        assert!(!set.has_pending());
    }

    #[test]
    fn reset_clears_active_only() {
        let mut set = SelectionSet::seeded(vec!["red".into()], FieldBinding::new("tags"));
        assert!(set.dispatch(SelectionCommand::Reset));
        assert!(set.active().is_empty());
        assert_eq!(set.committed(), ["red"]);
        assert!(!set.dispatch(SelectionCommand::Reset));
    }

    #[test]
    fn seeded_drops_duplicates() {
        let set = SelectionSet::seeded(
            vec!["a".into(), "b".into(), "a".into()],
            FieldBinding::new("tags"),
        );
        assert_eq!(set.active(), ["a", "b"]);
    }
}
