//! Initial value resolution.
//!
//! A field's starting value comes from the first tier that holds a valid
//! entry: the query string, then the persistent store, then the caller's
//! fallback, then the default. "Valid" means the raw text parses as JSON and
//! deserializes into the field's type (and passes the caller's shape check).
//! Anything else, including an empty string, counts as absent. Resolution
//! only reads, so resolving twice against the same sinks gives the same
//! value.

use facet_model::StoreKind;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::query::QueryParams;
use crate::store::KeyValueStore;

/// Knobs for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Drop `null` object members before deserializing, so fields that
    /// cannot hold `null` fall back to their `#[serde(default)]`.
    ///
    /// Only object members are recovered, at any depth. A `null` array
    /// element is left in place, so `[null, 1]` is still invalid as `Vec<f64>`.
    pub recover_null: bool,
    /// Query string beats the store. When false the store is consulted
    /// first and the query string becomes the second tier.
    pub prefer_url: bool,
    pub store: StoreKind,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            recover_null: false,
            prefer_url: true,
            store: StoreKind::Tab,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn with_recover_null(mut self, enable: bool) -> Self {
        self.recover_null = enable;
        self
    }

    #[must_use]
    pub fn with_prefer_url(mut self, enable: bool) -> Self {
        self.prefer_url = enable;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }
}

/// Which tier a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Url,
    Store,
    Fallback,
    Default,
}

impl ResolvedFrom {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Store => "store",
            Self::Fallback => "fallback",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ResolvedFrom,
}

/// Parse one raw entry, returning `None` for anything that is not a valid `T`.
///
/// With `recover_null`, `null` object members are removed first; see
/// [`ResolveOptions::recover_null`].
pub fn parse_entry<T: DeserializeOwned>(raw: Option<&str>, recover_null: bool) -> Option<T> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut value: Value = serde_json::from_str(raw).ok()?;
    if recover_null {
        strip_nulls(&mut value);
    }
    serde_json::from_value(value).ok()
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Reads field values out of a query string and one store.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    params: &'a QueryParams,
    store: &'a dyn KeyValueStore,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(
        params: &'a QueryParams,
        store: &'a dyn KeyValueStore,
        options: ResolveOptions,
    ) -> Self {
        Self {
            params,
            store,
            options,
        }
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolve `key`, falling back to `default`.
    pub fn resolve<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.resolve_where(key, default, None, |_| true).value
    }

    /// Resolve `key`, preferring `fallback` over `default` when both sinks are empty.
    pub fn resolve_or<T: DeserializeOwned>(&self, key: &str, default: T, fallback: Option<T>) -> T {
        self.resolve_where(key, default, fallback, |_| true).value
    }

    /// Full resolution with a shape check and the winning tier.
    ///
    /// `accept` rejects values that deserialize but have the wrong shape
    /// for this field; rejected values are treated as absent.
    pub fn resolve_where<T, F>(
        &self,
        key: &str,
        default: T,
        fallback: Option<T>,
        accept: F,
    ) -> Resolved<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let recover = self.options.recover_null;
        let from_url = parse_entry::<T>(self.params.get(key), recover).filter(|v| accept(v));

        if self.options.prefer_url {
            if let Some(value) = from_url {
                tracing::trace!(key, "resolved from query string");
                return Resolved {
                    value,
                    source: ResolvedFrom::Url,
                };
            }
        }

        let stored = self.store.get(key);
        if let Some(value) = parse_entry::<T>(stored.as_deref(), recover).filter(|v| accept(v)) {
            tracing::trace!(key, store = %self.options.store, "resolved from store");
            return Resolved {
                value,
                source: ResolvedFrom::Store,
            };
        }

        if let Some(value) = from_url {
            tracing::trace!(key, "resolved from query string after store");
            return Resolved {
                value,
                source: ResolvedFrom::Url,
            };
        }

        match fallback {
            Some(value) => {
                tracing::debug!(key, "no persisted entry, using fallback");
                Resolved {
                    value,
                    source: ResolvedFrom::Fallback,
                }
            }
            None => {
                tracing::debug!(key, "no persisted entry, using default");
                Resolved {
                    value: default,
                    source: ResolvedFrom::Default,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use facet_model::{RankedEntry, SortDirection};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bounds {
        #[serde(default = "nan")]
        min: f64,
        #[serde(default = "nan")]
        max: f64,
    }

    fn nan() -> f64 {
        f64::NAN
    }

    #[test]
    fn parse_entry_rejects_blank_and_malformed() {
        assert_eq!(parse_entry::<u32>(None, false), None);
        assert_eq!(parse_entry::<u32>(Some(""), false), None);
        assert_eq!(parse_entry::<u32>(Some("  "), false), None);
        assert_eq!(parse_entry::<u32>(Some("{oops"), false), None);
        assert_eq!(parse_entry::<u32>(Some("\"7\""), false), None);
        assert_eq!(parse_entry::<u32>(Some("7"), false), Some(7));
    }

    #[test]
    fn recover_null_falls_back_to_field_default() {
        let raw = Some(r#"{"min":null,"max":5}"#);
        assert_eq!(parse_entry::<Bounds>(raw, false), None);

        let bounds = parse_entry::<Bounds>(raw, true).expect("recovered");
        assert!(bounds.min.is_nan());
        assert_eq!(bounds.max, 5.0);
    }

    #[test]
    fn recover_null_reaches_objects_nested_in_arrays_only() {
        let nested = Some(r#"[{"min":null,"max":1},{"min":2}]"#);
        let bounds = parse_entry::<Vec<Bounds>>(nested, true).expect("recovered");
        assert!(bounds[0].min.is_nan());
        assert_eq!(bounds[1].min, 2.0);
        assert!(bounds[1].max.is_nan());

        assert_eq!(parse_entry::<Vec<f64>>(Some("[null, 1]"), true), None);
        assert_eq!(
            parse_entry::<Vec<Option<f64>>>(Some("[null, 1]"), true),
            Some(vec![None, Some(1.0)])
        );
    }

    #[test]
    fn recover_null_is_harmless_for_optional_rank() {
        let raw = Some(r#"{"direction":"none","rank":null}"#);
        assert_eq!(
            parse_entry::<RankedEntry>(raw, true),
            Some(RankedEntry::inactive())
        );
        assert_eq!(
            parse_entry::<RankedEntry>(Some(r#"{"direction":"ascending","rank":2}"#), true),
            Some(RankedEntry::active(SortDirection::Ascending, 2))
        );
    }
}
