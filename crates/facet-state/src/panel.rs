//! A filter panel: the scalar, selection and sort controls of one page.
//!
//! The panel owns every control's state machine, resolves their starting
//! values at mount, turns [`PanelCommand`]s into live-half changes plus
//! scheduled commits, and routes fired commits back to the right control.
//! Downstream fetching reads [`FilterPanel::committed_query`] only.

use std::time::Instant;

use facet_model::{FieldKind, Half, ScalarValue, SortDirection, Tristate};
use facet_persist::{ResolveOptions, ResolvedFrom, Sinks};
use facet_sync::{Commit, SyncCoordinator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::PanelConfig;
use crate::error::{Result, StateError};
use crate::ranked::{RankMap, RankedToggleCommand, RankedToggleState};
use crate::reducer::Reducer;
use crate::scalar::{ScalarCommand, ScalarField};
use crate::selection::{SelectionCommand, SelectionSet};

/// A user gesture against one panel.
///
/// Serialized with a `type` tag, e.g.
/// `{"type": "set_scalar", "field": "minPrice", "value": 10}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelCommand {
    SetScalar { field: String, value: ScalarValue },
    ClearScalar { field: String },
    ResetScalar { field: String },
    AddSelection { field: String, value: String },
    RemoveSelection { field: String, value: String },
    ToggleSelection { field: String, value: String },
    ResetSelection { field: String },
    ChangeSort { field: String, direction: SortDirection },
    /// Advance one sort field through none, ascending, descending.
    CycleSort { field: String },
    ResetFilters,
}

/// One sort key handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// The filters a search request is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Scalar fields that hold a value.
    pub filters: IndexMap<String, ScalarValue>,
    /// Non-empty selections.
    pub selections: IndexMap<String, Vec<String>>,
    /// Primary key first.
    pub sort: Vec<SortKey>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.selections.is_empty() && self.sort.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FilterPanel {
    config: PanelConfig,
    scalars: IndexMap<String, ScalarField<ScalarValue>>,
    selections: IndexMap<String, SelectionSet>,
    sort: Option<RankedToggleState>,
    /// Tier each key's starting value was read from at mount.
    sources: IndexMap<String, ResolvedFrom>,
}

impl FilterPanel {
    /// Build the panel and seed every control from the sinks.
    ///
    /// Stagger slots are claimed here in declaration order. Persisted values
    /// of the wrong kind (text in a number field, options the panel does not
    /// offer) are treated as absent.
    pub fn mount(config: PanelConfig, sinks: &Sinks, coordinator: &SyncCoordinator) -> Result<Self> {
        config.validate()?;
        for binding in config.bindings() {
            coordinator.register(&binding);
        }

        let mut sources = IndexMap::new();
        let mut scalars = IndexMap::new();
        for spec in &config.scalars {
            let binding = config.binding(&spec.key, spec.delay_ms);
            let resolver = sinks.resolver(ResolveOptions::default().with_store(binding.store));
            let resolved = resolver.resolve_where(&spec.key, None, None, |value: &Option<ScalarValue>| {
                value.as_ref().is_some_and(|v| v.kind() == spec.kind)
            });
            tracing::debug!(key = %spec.key, source = resolved.source.as_str(), "resolved scalar");
            sources.insert(spec.key.clone(), resolved.source);
            let initial = resolved.value.map_or(Tristate::Unset, Tristate::Value);
            scalars.insert(spec.key.clone(), ScalarField::new(initial, binding));
        }

        let mut selections = IndexMap::new();
        for spec in &config.selections {
            let binding = config.binding(&spec.key, spec.delay_ms);
            let resolver = sinks.resolver(ResolveOptions::default().with_store(binding.store));
            let resolved = resolver.resolve_where(&spec.key, Vec::new(), None, |_: &Vec<String>| true);
            tracing::debug!(key = %spec.key, source = resolved.source.as_str(), "resolved selection");
            sources.insert(spec.key.clone(), resolved.source);
            let mut values = resolved.value;
            if !spec.options.is_empty() {
                values.retain(|value| spec.options.contains(value));
            }
            selections.insert(spec.key.clone(), SelectionSet::seeded(values, binding));
        }

        let sort = config.sort.as_ref().map(|spec| {
            let binding = config.binding(&spec.key, spec.delay_ms);
            let options = ResolveOptions::default()
                .with_store(binding.store)
                .with_recover_null(true);
            let resolved = sinks
                .resolver(options)
                .resolve_where(&spec.key, RankMap::new(), None, |_: &RankMap| true);
            tracing::debug!(key = %spec.key, source = resolved.source.as_str(), "resolved sort");
            sources.insert(spec.key.clone(), resolved.source);
            let initial = resolved.value;
            RankedToggleState::seeded(spec.fields.iter().cloned(), &initial, binding)
        });

        tracing::info!(
            panel = %config.name,
            scalars = scalars.len(),
            selections = selections.len(),
            sorted = sort.is_some(),
            "panel mounted"
        );
        Ok(Self {
            config,
            scalars,
            selections,
            sort,
            sources,
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn scalar(&self, key: &str) -> Option<&ScalarField<ScalarValue>> {
        self.scalars.get(key)
    }

    pub fn selection(&self, key: &str) -> Option<&SelectionSet> {
        self.selections.get(key)
    }

    pub fn sort(&self) -> Option<&RankedToggleState> {
        self.sort.as_ref()
    }

    /// Which tier `key` was seeded from when the panel mounted.
    ///
    /// Entries rejected for their shape count as absent, so a key whose
    /// query-string entry had the wrong kind reports the tier that won instead.
    pub fn resolved_from(&self, key: &str) -> Option<ResolvedFrom> {
        self.sources.get(key).copied()
    }

    pub fn scalars(&self) -> impl Iterator<Item = (&str, &ScalarField<ScalarValue>)> {
        self.scalars.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn selections(&self) -> impl Iterator<Item = (&str, &SelectionSet)> {
        self.selections.iter().map(|(key, set)| (key.as_str(), set))
    }

    /// Apply a gesture to the live halves and schedule the affected commits.
    ///
    /// Returns whether anything changed. Commands that change nothing do not
    /// touch the coordinator, so they never push a pending deadline out.
    pub fn dispatch(
        &mut self,
        command: PanelCommand,
        now: Instant,
        coordinator: &mut SyncCoordinator,
        sinks: &mut Sinks,
    ) -> Result<bool> {
        tracing::trace!(panel = %self.config.name, ?command, "dispatch");
        match command {
            PanelCommand::SetScalar { field, value } => {
                let expected = self.scalar_kind(&field)?;
                if value.kind() != expected {
                    return Err(StateError::KindMismatch {
                        field,
                        expected,
                        actual: value.kind(),
                    });
                }
                self.update_scalar(&field, ScalarCommand::Set(value), now, coordinator)
            }
            PanelCommand::ClearScalar { field } => {
                self.update_scalar(&field, ScalarCommand::Clear, now, coordinator)
            }
            PanelCommand::ResetScalar { field } => {
                self.update_scalar(&field, ScalarCommand::Reset, now, coordinator)
            }
            PanelCommand::AddSelection { field, value } => {
                self.update_selection(&field, SelectionCommand::Add(value), now, coordinator)
            }
            PanelCommand::RemoveSelection { field, value } => {
                self.update_selection(&field, SelectionCommand::Remove(value), now, coordinator)
            }
            PanelCommand::ToggleSelection { field, value } => {
                self.update_selection(&field, SelectionCommand::Toggle(value), now, coordinator)
            }
            PanelCommand::ResetSelection { field } => {
                self.update_selection(&field, SelectionCommand::Reset, now, coordinator)
            }
            PanelCommand::ChangeSort { field, direction } => {
                self.update_sort(field, |_| direction, now, coordinator)
            }
            PanelCommand::CycleSort { field } => {
                self.update_sort(field, SortDirection::cycle, now, coordinator)
            }
            PanelCommand::ResetFilters => Ok(self.reset_filters(now, sinks, coordinator)? > 0),
        }
    }

    fn scalar_kind(&self, field: &str) -> Result<FieldKind> {
        self.config
            .scalar(field)
            .map(|spec| spec.kind)
            .ok_or_else(|| self.unknown_field(field))
    }

    fn unknown_field(&self, field: &str) -> StateError {
        StateError::UnknownField {
            panel: self.config.name.clone(),
            field: field.to_string(),
        }
    }

    fn update_scalar(
        &mut self,
        field: &str,
        command: ScalarCommand<ScalarValue>,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> Result<bool> {
        let Some(scalar) = self.scalars.get_mut(field) else {
            return Err(self.unknown_field(field));
        };
        if !scalar.dispatch(command) {
            return Ok(false);
        }
        scalar.schedule(now, coordinator)?;
        Ok(true)
    }

    fn update_selection(
        &mut self,
        field: &str,
        command: SelectionCommand,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> Result<bool> {
        let Some(selection) = self.selections.get_mut(field) else {
            return Err(self.unknown_field(field));
        };
        if let SelectionCommand::Add(value) | SelectionCommand::Toggle(value) = &command {
            let allowed = self
                .config
                .selection(field)
                .is_none_or(|spec| spec.options.is_empty() || spec.options.contains(value));
            if !allowed {
                tracing::debug!(field, "ignoring value the selection does not offer");
                return Ok(false);
            }
        }
        if !selection.dispatch(command) {
            return Ok(false);
        }
        selection.schedule(now, coordinator)?;
        Ok(true)
    }

    fn update_sort<F>(
        &mut self,
        field: String,
        direction: F,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> Result<bool>
    where
        F: FnOnce(SortDirection) -> SortDirection,
    {
        let Some(sort) = self.sort.as_mut() else {
            return Err(StateError::SortNotConfigured {
                panel: self.config.name.clone(),
            });
        };
        if !sort.has_field(&field) {
            return Err(StateError::UnknownField {
                panel: self.config.name.clone(),
                field,
            });
        }
        let direction = direction(sort.entry(Half::Live, &field).direction);
        let changed = sort.dispatch(RankedToggleCommand::ChangeValue {
            field,
            direction,
            half: Half::Live,
        });
        if !changed {
            return Ok(false);
        }
        sort.schedule(now, coordinator)?;
        Ok(true)
    }

    /// The coordinator's fire callback: copy a committed entry into the
    /// owning control's committed half.
    ///
    /// Returns false for keys this panel does not own and for commits that
    /// change nothing.
    pub fn apply_commit(&mut self, commit: &Commit) -> bool {
        let key = commit.key();
        if let Some(scalar) = self.scalars.get_mut(key) {
            return scalar.dispatch(ScalarCommand::Commit(commit.decode_tristate()));
        }
        if let Some(selection) = self.selections.get_mut(key) {
            let values: Vec<String> = commit.decode().unwrap_or_default();
            return selection.dispatch(SelectionCommand::Commit(values));
        }
        if let Some(sort) = self.sort.as_mut().filter(|sort| sort.binding().key == key) {
            let active: RankMap = commit.decode().unwrap_or_default();
            let entries = sort.complete(&active);
            return sort.dispatch(RankedToggleCommand::ChangeState {
                entries,
                half: Half::Committed,
            });
        }
        tracing::debug!(panel = %self.config.name, key, "commit for a key this panel does not own");
        false
    }

    /// Put every control back to its default.
    ///
    /// The panel's keys are deleted from the query string and both stores
    /// right away; the committed halves follow through the normal debounce
    /// path. Returns how many controls changed.
    pub fn reset_filters(
        &mut self,
        now: Instant,
        sinks: &mut Sinks,
        coordinator: &mut SyncCoordinator,
    ) -> Result<usize> {
        let mut changed = 0;
        for scalar in self.scalars.values_mut() {
            if scalar.dispatch(ScalarCommand::Reset) {
                changed += 1;
            }
        }
        for selection in self.selections.values_mut() {
            if selection.dispatch(SelectionCommand::Reset) {
                changed += 1;
            }
        }
        if let Some(sort) = self.sort.as_mut() {
            let entries = sort.cleared();
            if sort.dispatch(RankedToggleCommand::ChangeState {
                entries,
                half: Half::Live,
            }) {
                changed += 1;
            }
        }

        let bindings = self.config.bindings();
        sinks.remove_keys(&bindings);
        self.schedule_all(now, coordinator)?;
        tracing::info!(panel = %self.config.name, changed, "filters reset");
        Ok(changed)
    }

    fn schedule_all(&self, now: Instant, coordinator: &mut SyncCoordinator) -> Result<()> {
        for scalar in self.scalars.values() {
            scalar.schedule(now, coordinator)?;
        }
        for selection in self.selections.values() {
            selection.schedule(now, coordinator)?;
        }
        if let Some(sort) = &self.sort {
            sort.schedule(now, coordinator)?;
        }
        Ok(())
    }

    /// Cancel this panel's pending commits. Other panels are untouched.
    pub fn unmount(&self, coordinator: &mut SyncCoordinator) -> usize {
        let keys = self.config.keys();
        let cancelled = coordinator.cancel_all(keys.iter().map(String::as_str));
        tracing::debug!(panel = %self.config.name, cancelled, "panel unmounted");
        cancelled
    }

    /// Whether the control bound to `key` has a change in flight.
    pub fn is_pending(&self, key: &str) -> bool {
        if let Some(scalar) = self.scalars.get(key) {
            return scalar.is_pending();
        }
        if let Some(selection) = self.selections.get(key) {
            return selection.has_pending();
        }
        self.sort
            .as_ref()
            .is_some_and(|sort| sort.binding().key == key && sort.is_pending())
    }

    pub fn has_pending(&self) -> bool {
        self.config.keys().iter().any(|key| self.is_pending(key))
    }

    /// Values of a selection whose change is still in flight.
    pub fn pending_values(&self, field: &str) -> Result<Vec<&str>> {
        self.selections
            .get(field)
            .map(SelectionSet::pending_values)
            .ok_or_else(|| self.unknown_field(field))
    }

    /// The query the fetching layer sees: committed halves only.
    pub fn committed_query(&self) -> SearchQuery {
        self.query(Half::Committed)
    }

    pub fn query(&self, half: Half) -> SearchQuery {
        let filters = self
            .scalars
            .iter()
            .filter_map(|(key, field)| {
                let value = match half {
                    Half::Live => field.live(),
                    Half::Committed => field.committed(),
                };
                value.value().map(|v| (key.clone(), v.clone()))
            })
            .collect();
        let selections = self
            .selections
            .iter()
            .filter_map(|(key, set)| {
                let values = match half {
                    Half::Live => set.active(),
                    Half::Committed => set.committed(),
                };
                (!values.is_empty()).then(|| (key.clone(), values.to_vec()))
            })
            .collect();
        let sort = self
            .sort
            .as_ref()
            .map(|sort| {
                sort.sort_order(half)
                    .into_iter()
                    .map(|(field, direction)| SortKey {
                        field: field.to_string(),
                        direction,
                    })
                    .collect()
            })
            .unwrap_or_default();
        SearchQuery {
            filters,
            selections,
            sort,
        }
    }
}
