//! The shared persistence targets for one document.

use facet_model::{FieldBinding, StoreKind, Tristate};

use crate::error::Result;
use crate::location::{Location, MemoryLocation};
use crate::resolve::{ResolveOptions, Resolver};
use crate::store::{KeyValueStore, MemoryStore};
use crate::url_builder::{UrlOverrides, build_url};

/// The document location plus both persistent stores.
///
/// Every field writes here under its own key; nothing locks, so keys must be
/// disjoint across fields.
#[derive(Debug)]
pub struct Sinks {
    pub location: Box<dyn Location>,
    pub tab: Box<dyn KeyValueStore>,
    pub local: Box<dyn KeyValueStore>,
}

impl Sinks {
    pub fn new(
        location: Box<dyn Location>,
        tab: Box<dyn KeyValueStore>,
        local: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            location,
            tab,
            local,
        }
    }

    /// Fully in-memory sinks starting at `url`.
    pub fn in_memory(url: &str) -> Self {
        Self::new(
            Box::new(MemoryLocation::new(url)),
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        )
    }

    pub fn store(&self, kind: StoreKind) -> &dyn KeyValueStore {
        match kind {
            StoreKind::Tab => self.tab.as_ref(),
            StoreKind::Local => self.local.as_ref(),
        }
    }

    pub fn store_mut(&mut self, kind: StoreKind) -> &mut dyn KeyValueStore {
        match kind {
            StoreKind::Tab => self.tab.as_mut(),
            StoreKind::Local => self.local.as_mut(),
        }
    }

    /// A resolver over the current query string and the store named in `options`.
    pub fn resolver(&self, options: ResolveOptions) -> Resolver<'_> {
        Resolver::new(self.location.query(), self.store(options.store), options)
    }

    /// Write one field's entry to the query string and its store.
    ///
    /// The query string is re-read at call time and updated with a history
    /// replace. The store write happens even when it is the only one that
    /// can fail; its error is returned after the URL is already updated.
    pub fn write_entry(&mut self, binding: &FieldBinding, entry: &Tristate<String>) -> Result<()> {
        let overrides = UrlOverrides::new().entry(binding.key.as_str(), entry.clone());
        let url = build_url(self.location.path(), self.location.query(), &overrides);
        self.location.replace(&url);

        let store = self.store_mut(binding.store);
        match entry {
            Tristate::Value(raw) => store.set(&binding.key, raw),
            Tristate::Cleared => store.set(&binding.key, ""),
            Tristate::Unset => store.remove(&binding.key),
        }
    }

    /// Delete `bindings` from the query string (one replace) and their stores.
    ///
    /// Store failures are logged and skipped so a reset always finishes.
    pub fn remove_keys<'b>(&mut self, bindings: impl IntoIterator<Item = &'b FieldBinding>) {
        let bindings: Vec<&FieldBinding> = bindings.into_iter().collect();
        let overrides = bindings.iter().fold(UrlOverrides::new(), |acc, binding| {
            acc.unset(binding.key.as_str())
        });
        if overrides
            .iter()
            .any(|(key, _)| self.location.query().contains_key(key))
        {
            let url = build_url(self.location.path(), self.location.query(), &overrides);
            self.location.replace(&url);
        }

        for binding in bindings {
            if let Err(error) = self.store_mut(binding.store).remove(&binding.key) {
                tracing::warn!(key = %binding.key, %error, "failed to remove stored entry");
            }
        }
    }
}
