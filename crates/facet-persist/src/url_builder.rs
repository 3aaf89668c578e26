//! Merge field entries into the current query string.

use facet_model::Tristate;
use serde::Serialize;

use crate::error::{PersistError, Result};
use crate::query::QueryParams;

/// Per-key edits applied on top of the current query string.
///
/// Each override is an already-serialized entry: `Value` sets the key,
/// `Cleared` keeps the key with an empty value, `Unset` deletes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlOverrides {
    entries: Vec<(String, Tristate<String>)>,
}

impl UrlOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, entry: Tristate<String>) -> Self {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, entry));
        self
    }

    /// Serialize `value` as JSON and set it under `key`.
    pub fn value<T: Serialize + ?Sized>(self, key: impl Into<String>, value: &T) -> Result<Self> {
        let key = key.into();
        let raw = serde_json::to_string(value).map_err(|source| PersistError::Encode {
            key: key.clone(),
            source,
        })?;
        Ok(self.entry(key, Tristate::Value(raw)))
    }

    /// Set an already-serialized value.
    #[must_use]
    pub fn raw(self, key: impl Into<String>, raw: impl Into<String>) -> Self {
        self.entry(key, Tristate::Value(raw.into()))
    }

    #[must_use]
    pub fn clear(self, key: impl Into<String>) -> Self {
        self.entry(key, Tristate::Cleared)
    }

    #[must_use]
    pub fn unset(self, key: impl Into<String>) -> Self {
        self.entry(key, Tristate::Unset)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tristate<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn apply_to(&self, params: &mut QueryParams) {
        for (key, entry) in &self.entries {
            match entry {
                Tristate::Value(raw) => params.set(key.as_str(), raw.as_str()),
                Tristate::Cleared => params.set(key.as_str(), ""),
                Tristate::Unset => {
                    params.remove(key);
                }
            }
        }
    }
}

/// Build `base_path?query` from the current parameters plus `overrides`.
///
/// Parameters not named in `overrides` are preserved in place.
pub fn build_url(base_path: &str, current: &QueryParams, overrides: &UrlOverrides) -> String {
    let mut params = current.clone();
    overrides.apply_to(&mut params);
    join_url(base_path, &params)
}

/// Join a path and parameters, omitting the `?` when there are none.
pub fn join_url(base_path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        base_path.to_string()
    } else {
        format!("{base_path}?{}", params.to_query_string())
    }
}
