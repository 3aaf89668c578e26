//! Encoding field values into persisted entries.

use facet_model::{RankedEntry, Tristate};
use indexmap::IndexMap;
use serde::Serialize;

/// A field value that can be written to the query string and store.
///
/// Values that mean "nothing selected" encode as [`Tristate::Unset`] so a
/// field at its default leaves no key behind.
pub trait PersistValue: PartialEq {
    fn to_entry(&self) -> serde_json::Result<Tristate<String>>;
}

impl<T> PersistValue for Tristate<T>
where
    T: Serialize + PartialEq,
{
    fn to_entry(&self) -> serde_json::Result<Tristate<String>> {
        self.as_ref().try_map(serde_json::to_string)
    }
}

impl PersistValue for Vec<String> {
    fn to_entry(&self) -> serde_json::Result<Tristate<String>> {
        if self.is_empty() {
            return Ok(Tristate::Unset);
        }
        serde_json::to_string(self).map(Tristate::Value)
    }
}

/// A ranked toggle half: only active entries are written.
impl PersistValue for IndexMap<String, RankedEntry> {
    fn to_entry(&self) -> serde_json::Result<Tristate<String>> {
        let active: IndexMap<&str, &RankedEntry> = self
            .iter()
            .filter(|(_, entry)| entry.is_active())
            .map(|(field, entry)| (field.as_str(), entry))
            .collect();
        if active.is_empty() {
            return Ok(Tristate::Unset);
        }
        serde_json::to_string(&active).map(Tristate::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_model::SortDirection;

    #[test]
    fn tristate_encodes_each_state() {
        assert_eq!(Tristate::<f64>::Unset.to_entry().unwrap(), Tristate::Unset);
        assert_eq!(Tristate::<f64>::Cleared.to_entry().unwrap(), Tristate::Cleared);
        assert_eq!(
            Tristate::Value(10.5_f64).to_entry().unwrap(),
            Tristate::Value("10.5".to_string())
        );
    }

    #[test]
    fn empty_selection_is_unset() {
        assert_eq!(Vec::<String>::new().to_entry().unwrap(), Tristate::Unset);
        assert_eq!(
            vec!["red".to_string()].to_entry().unwrap(),
            Tristate::Value("[\"red\"]".to_string())
        );
    }

    #[test]
    fn rank_map_writes_active_entries_only() {
        let mut map = IndexMap::new();
        map.insert("price".to_string(), RankedEntry::inactive());
        assert_eq!(map.to_entry().unwrap(), Tristate::Unset);

        map.insert(
            "title".to_string(),
            RankedEntry::active(SortDirection::Ascending, 0),
        );
        assert_eq!(
            map.to_entry().unwrap(),
            Tristate::Value(
                "{\"title\":{\"direction\":\"ascending\",\"rank\":0}}".to_string()
            )
        );
    }
}
