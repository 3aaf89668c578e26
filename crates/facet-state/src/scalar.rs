//! Single-valued filter fields.

use std::time::Instant;

use facet_model::{FieldBinding, PersistedField, Tristate};
use facet_sync::SyncCoordinator;
use serde::Serialize;

use crate::reducer::{Reducer, replace_if_changed};

/// Commands for a [`ScalarField`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarCommand<T> {
    /// New live value from user input.
    Set(T),
    /// Explicitly empty the field; a shared link keeps the key with no value.
    Clear,
    /// Back to the default, which leaves no key behind once committed.
    Reset,
    /// Fired by the coordinator.
    Commit(Tristate<T>),
}

/// A price bound, search box or toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField<T> {
    field: PersistedField<Tristate<T>>,
}

impl<T: Clone> ScalarField<T> {
    pub fn new(initial: Tristate<T>, binding: FieldBinding) -> Self {
        Self {
            field: PersistedField::new(initial, binding),
        }
    }
}

impl<T> ScalarField<T> {
    pub fn live(&self) -> &Tristate<T> {
        &self.field.live
    }

    pub fn committed(&self) -> &Tristate<T> {
        &self.field.committed
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.field.binding
    }
}

impl<T: PartialEq> ScalarField<T> {
    pub fn is_pending(&self) -> bool {
        self.field.is_pending()
    }
}

impl<T: Serialize + PartialEq> ScalarField<T> {
    /// Arm (or cancel) this field's commit.
    pub fn schedule(
        &self,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> facet_sync::Result<Option<Instant>> {
        coordinator.schedule(now, &self.field.binding, &self.field.live, &self.field.committed)
    }
}

impl<T: PartialEq> Reducer for ScalarField<T> {
    type Command = ScalarCommand<T>;

    fn dispatch(&mut self, command: ScalarCommand<T>) -> bool {
        match command {
            ScalarCommand::Set(value) => replace_if_changed(&mut self.field.live, Tristate::Value(value)),
            ScalarCommand::Clear => replace_if_changed(&mut self.field.live, Tristate::Cleared),
            ScalarCommand::Reset => replace_if_changed(&mut self.field.live, Tristate::Unset),
            ScalarCommand::Commit(value) => replace_if_changed(&mut self.field.committed, value),
        }
    }
}
