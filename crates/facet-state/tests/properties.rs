//! Property tests for the rank invariant and selection no-ops.

use facet_model::{FieldBinding, Half, RankedEntry, SortDirection};
use facet_state::{
    RankMap, RankedToggleCommand, RankedToggleState, Reducer, SelectionCommand, SelectionSet,
    ranks_are_contiguous,
};
use proptest::prelude::*;

const FIELDS: [&str; 4] = ["price", "title", "popularity", "rating"];

fn direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop::sample::select(SortDirection::all().to_vec())
}

fn half_strategy() -> impl Strategy<Value = Half> {
    prop::sample::select(vec![Half::Live, Half::Committed])
}

fn change_strategy() -> impl Strategy<Value = (usize, SortDirection, Half)> {
    (0..FIELDS.len(), direction_strategy(), half_strategy())
}

fn entry_strategy() -> impl Strategy<Value = RankedEntry> {
    (direction_strategy(), prop::option::of(0usize..8))
        .prop_map(|(direction, rank)| RankedEntry { direction, rank })
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["red", "blue", "green", "sale"]).prop_map(String::from)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn ranks_stay_contiguous(changes in prop::collection::vec(change_strategy(), 0..40)) {
        let mut state = RankedToggleState::new(FIELDS, FieldBinding::new("sort"));
        for (field, direction, half) in changes {
            state.dispatch(RankedToggleCommand::ChangeValue {
                field: FIELDS[field].to_string(),
                direction,
                half,
            });
            prop_assert!(ranks_are_contiguous(state.live()), "live: {:?}", state.live());
            prop_assert!(
                ranks_are_contiguous(state.committed()),
                "committed: {:?}",
                state.committed()
            );
        }
    }

    #[test]
    fn surviving_fields_keep_relative_order(
        changes in prop::collection::vec(change_strategy(), 1..30),
        last in change_strategy(),
    ) {
        let mut state = RankedToggleState::new(FIELDS, FieldBinding::new("sort"));
        for (field, direction, _) in changes {
            state.dispatch(RankedToggleCommand::ChangeValue {
                field: FIELDS[field].to_string(),
                direction,
                half: Half::Live,
            });
        }
        let (field, direction, _) = last;
        let target = FIELDS[field];
        let before: Vec<String> = state
            .sort_order(Half::Live)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| name != target)
            .collect();

        state.dispatch(RankedToggleCommand::ChangeValue {
            field: target.to_string(),
            direction,
            half: Half::Live,
        });
        let after: Vec<String> = state
            .sort_order(Half::Live)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| name != target)
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn seeding_normalises_any_persisted_map(
        entries in prop::collection::vec(entry_strategy(), FIELDS.len()),
    ) {
        let initial: RankMap = FIELDS
            .iter()
            .map(|field| field.to_string())
            .zip(entries)
            .collect();
        let state = RankedToggleState::seeded(FIELDS, &initial, FieldBinding::new("sort"));
        prop_assert!(ranks_are_contiguous(state.live()));
        prop_assert_eq!(state.live(), state.committed());
    }

    #[test]
    fn add_of_active_and_remove_of_absent_change_nothing(
        seed in prop::collection::vec(tag_strategy(), 0..6),
        value in tag_strategy(),
    ) {
        let mut set = SelectionSet::seeded(seed, FieldBinding::new("tags"));
        if set.contains(&value) {
            let before = set.clone();
            prop_assert!(!set.dispatch(SelectionCommand::Add(value)));
            prop_assert_eq!(set, before);
        } else {
            let before = set.clone();
            prop_assert!(!set.dispatch(SelectionCommand::Remove(value)));
            prop_assert_eq!(set, before);
        }
    }

    #[test]
    fn active_never_holds_duplicates(
        commands in prop::collection::vec((any::<bool>(), tag_strategy()), 0..30),
    ) {
        let mut set = SelectionSet::new(FieldBinding::new("tags"));
        for (add, value) in commands {
            let command = if add {
                SelectionCommand::Add(value)
            } else {
                SelectionCommand::Toggle(value)
            };
            set.dispatch(command);
        }
        let mut unique = set.active().to_vec();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), set.active().len());
    }
}
