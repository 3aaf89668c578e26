//! Multi-field sort order.
//!
//! Each sortable field carries a direction and an activation rank. Rank 0 is
//! the primary sort key, 1 the secondary and so on. Within one half, the
//! ranks of the active fields are always exactly `0..active_count`.

use std::time::Instant;

use facet_model::{FieldBinding, Half, RankedEntry, SortDirection};
use facet_sync::SyncCoordinator;
use indexmap::IndexMap;

use crate::reducer::Reducer;

/// Field name to entry, in the caller's display order.
pub type RankMap = IndexMap<String, RankedEntry>;

/// Commands for a [`RankedToggleState`].
#[derive(Debug, Clone, PartialEq)]
pub enum RankedToggleCommand {
    /// Set one field's direction and renumber the active fields.
    ChangeValue {
        field: String,
        direction: SortDirection,
        half: Half,
    },
    /// Bulk replace. Entries equal to the current ones are left untouched.
    ChangeState { entries: RankMap, half: Half },
}

/// Live and committed sort maps for one panel.
///
/// The whole map persists under a single key, so a commit always moves the
/// committed half from one consistent ranking to another.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedToggleState {
    live: RankMap,
    committed: RankMap,
    binding: FieldBinding,
}

impl RankedToggleState {
    /// Every field starts inactive.
    pub fn new<I, S>(fields: I, binding: FieldBinding) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map: RankMap = fields
            .into_iter()
            .map(|field| (field.into(), RankedEntry::inactive()))
            .collect();
        Self {
            live: map.clone(),
            committed: map,
            binding,
        }
    }

    /// Start both halves from persisted entries.
    ///
    /// Entries for unknown fields are dropped and the result is normalised,
    /// so a hand-edited link with gapped or duplicated ranks still yields a
    /// valid ranking.
    pub fn seeded<I, S>(fields: I, initial: &RankMap, binding: FieldBinding) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::new(fields, binding);
        let mut map = state.complete(initial);
        if normalize(&mut map) {
            tracing::debug!(key = %state.binding.key, "normalised persisted sort ranks");
        }
        state.live = map.clone();
        state.committed = map;
        state
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    pub fn live(&self) -> &RankMap {
        &self.live
    }

    pub fn committed(&self) -> &RankMap {
        &self.committed
    }

    pub fn half(&self, half: Half) -> &RankMap {
        match half {
            Half::Live => &self.live,
            Half::Committed => &self.committed,
        }
    }

    fn half_mut(&mut self, half: Half) -> &mut RankMap {
        match half {
            Half::Live => &mut self.live,
            Half::Committed => &mut self.committed,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.live.keys().map(String::as_str)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.live.contains_key(field)
    }

    pub fn entry(&self, half: Half, field: &str) -> RankedEntry {
        self.half(half).get(field).copied().unwrap_or_default()
    }

    /// Active fields of `half` ordered by rank.
    pub fn sort_order(&self, half: Half) -> Vec<(&str, SortDirection)> {
        let mut active: Vec<(usize, &str, SortDirection)> = self
            .half(half)
            .iter()
            .filter_map(|(field, entry)| {
                entry
                    .rank
                    .filter(|_| entry.direction.is_active())
                    .map(|rank| (rank, field.as_str(), entry.direction))
            })
            .collect();
        active.sort_by_key(|(rank, _, _)| *rank);
        active
            .into_iter()
            .map(|(_, field, direction)| (field, direction))
            .collect()
    }

    pub fn is_pending(&self) -> bool {
        self.live != self.committed
    }

    /// A map over this state's fields: every field inactive except those
    /// named in `entries`.
    pub fn complete(&self, entries: &RankMap) -> RankMap {
        self.live
            .keys()
            .map(|field| {
                let entry = entries.get(field).copied().unwrap_or_default();
                (field.clone(), entry)
            })
            .collect()
    }

    /// A map over this state's fields with every field inactive.
    pub fn cleared(&self) -> RankMap {
        self.complete(&RankMap::new())
    }

    pub fn schedule(
        &self,
        now: Instant,
        coordinator: &mut SyncCoordinator,
    ) -> facet_sync::Result<Option<Instant>> {
        coordinator.schedule(now, &self.binding, &self.live, &self.committed)
    }
}

impl Reducer for RankedToggleState {
    type Command = RankedToggleCommand;

    fn dispatch(&mut self, command: RankedToggleCommand) -> bool {
        match command {
            RankedToggleCommand::ChangeValue {
                field,
                direction,
                half,
            } => change_value(self.half_mut(half), &field, direction),
            RankedToggleCommand::ChangeState { entries, half } => {
                let map = self.half_mut(half);
                let mut changed = false;
                for (field, entry) in entries {
                    if map.get(&field) != Some(&entry) {
                        map.insert(field, entry);
                        changed = true;
                    }
                }
                changed
            }
        }
    }
}

/// Set `field` to `direction` and renumber every active field.
///
/// Active fields keep their relative order. A field that stays active keeps
/// its place in that order; a newly active field goes last; a field turned
/// off drops out and the ones after it move up.
fn change_value(map: &mut RankMap, field: &str, direction: SortDirection) -> bool {
    let before = map.clone();
    let previous = map.get(field).copied().unwrap_or_default();
    let stays_active = direction.is_active() && previous.is_active();

    let mut ranked: Vec<(usize, usize, String)> = map
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name.as_str() != field || stays_active)
        .filter_map(|(position, (name, entry))| {
            entry
                .rank
                .filter(|_| entry.direction.is_active())
                .map(|rank| (rank, position, name.clone()))
        })
        .collect();
    ranked.sort_unstable();

    let next_free = ranked.len();
    let mut own_rank = None;
    for (new_rank, (_, _, name)) in ranked.into_iter().enumerate() {
        if name == field {
            own_rank = Some(new_rank);
        } else if let Some(entry) = map.get_mut(&name) {
            entry.rank = Some(new_rank);
        }
    }

    let entry = if direction.is_active() {
        RankedEntry::active(direction, own_rank.unwrap_or(next_free))
    } else {
        RankedEntry::inactive()
    };
    match map.get_mut(field) {
        Some(slot) => *slot = entry,
        None => {
            map.insert(field.to_string(), entry);
        }
    }

    *map != before
}

/// Renumber active entries to `0..n` by (rank, position); inactive ones lose
/// their rank. Active entries without a rank go last. Returns whether
/// anything moved.
pub(crate) fn normalize(map: &mut RankMap) -> bool {
    let before = map.clone();
    for entry in map.values_mut() {
        if !entry.direction.is_active() {
            entry.rank = None;
        }
    }

    let mut order: Vec<(usize, usize)> = map
        .values()
        .enumerate()
        .filter(|(_, entry)| entry.direction.is_active())
        .map(|(position, entry)| (entry.rank.unwrap_or(usize::MAX), position))
        .collect();
    order.sort_unstable();
    for (new_rank, (_, position)) in order.into_iter().enumerate() {
        if let Some((_, entry)) = map.get_index_mut(position) {
            entry.rank = Some(new_rank);
        }
    }

    *map != before
}

/// Whether the active entries' ranks are exactly `0..active_count`.
pub fn ranks_are_contiguous(map: &RankMap) -> bool {
    let mut ranks: Vec<Option<usize>> = map
        .values()
        .filter(|entry| entry.direction.is_active())
        .map(|entry| entry.rank)
        .collect();
    ranks.sort_unstable();
    ranks
        .into_iter()
        .enumerate()
        .all(|(expected, rank)| rank == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_sort() -> RankedToggleState {
        RankedToggleState::new(["price", "title", "popularity"], FieldBinding::new("sort"))
    }

    fn change(state: &mut RankedToggleState, field: &str, direction: SortDirection) -> bool {
        state.dispatch(RankedToggleCommand::ChangeValue {
            field: field.to_string(),
            direction,
            half: Half::Live,
        })
    }

    fn ranks(state: &RankedToggleState) -> Vec<(&str, Option<usize>)> {
        state
            .live()
            .iter()
            .map(|(field, entry)| (field.as_str(), entry.rank))
            .collect()
    }

    #[test]
    fn activation_order_sets_ranks() {
        let mut state = catalog_sort();
        change(&mut state, "price", SortDirection::Ascending);
        change(&mut state, "title", SortDirection::Ascending);
        change(&mut state, "popularity", SortDirection::Ascending);
        assert_eq!(
            ranks(&state),
            [("price", Some(0)), ("title", Some(1)), ("popularity", Some(2))]
        );

        change(&mut state, "price", SortDirection::Off);
        assert_eq!(
            ranks(&state),
            [("price", None), ("title", Some(0)), ("popularity", Some(1))]
        );
        assert_eq!(state.live()["price"], RankedEntry::inactive());
    }

    #[test]
    fn direction_flip_keeps_rank() {
        let mut state = catalog_sort();
        change(&mut state, "title", SortDirection::Ascending);
        change(&mut state, "price", SortDirection::Ascending);
        assert!(change(&mut state, "title", SortDirection::Descending));
        assert_eq!(
            state.entry(Half::Live, "title"),
            RankedEntry::active(SortDirection::Descending, 0)
        );
        assert_eq!(state.entry(Half::Live, "price").rank, Some(1));
    }

    #[test]
    fn reactivated_field_goes_last() {
        let mut state = catalog_sort();
        change(&mut state, "price", SortDirection::Ascending);
        change(&mut state, "title", SortDirection::Ascending);
        change(&mut state, "price", SortDirection::Off);
        change(&mut state, "price", SortDirection::Descending);
        assert_eq!(
            state.sort_order(Half::Live),
            [("title", SortDirection::Ascending), ("price", SortDirection::Descending)]
        );
    }

    #[test]
    fn unchanged_direction_reports_no_change() {
        let mut state = catalog_sort();
        change(&mut state, "price", SortDirection::Ascending);
        assert!(!change(&mut state, "price", SortDirection::Ascending));
        assert!(!change(&mut state, "title", SortDirection::Off));
    }

    #[test]
    fn change_state_skips_equal_entries() {
        let mut state = catalog_sort();
        change(&mut state, "price", SortDirection::Ascending);
        let live = state.live().clone();

        assert!(state.dispatch(RankedToggleCommand::ChangeState {
            entries: live.clone(),
            half: Half::Committed,
        }));
        assert!(!state.is_pending());
        assert!(!state.dispatch(RankedToggleCommand::ChangeState {
            entries: live,
            half: Half::Committed,
        }));
    }

    #[test]
    fn seeded_normalises_gapped_ranks() {
        let mut initial = RankMap::new();
        initial.insert("title".into(), RankedEntry::active(SortDirection::Ascending, 4));
        initial.insert("price".into(), RankedEntry::active(SortDirection::Descending, 4));
        initial.insert("rating".into(), RankedEntry::active(SortDirection::Ascending, 0));

        let state = RankedToggleState::seeded(
            ["price", "title", "popularity"],
            &initial,
            FieldBinding::new("sort"),
        );
        // Tie on rank 4 breaks by display position; unknown fields drop out.
        assert_eq!(
            ranks(&state),
            [("price", Some(0)), ("title", Some(1)), ("popularity", None)]
        );
        assert!(ranks_are_contiguous(state.committed()));
        assert!(!state.is_pending());
    }

    #[test]
    fn active_entry_without_rank_is_appended() {
        let mut map = RankMap::new();
        map.insert(
            "price".into(),
            RankedEntry {
                direction: SortDirection::Ascending,
                rank: None,
            },
        );
        map.insert("title".into(), RankedEntry::active(SortDirection::Ascending, 3));
        assert!(!ranks_are_contiguous(&map));
        assert!(normalize(&mut map));
        assert_eq!(map["title"].rank, Some(0));
        assert_eq!(map["price"].rank, Some(1));
    }
}
