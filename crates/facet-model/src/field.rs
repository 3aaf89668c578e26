//! Persisted fields and the binding that ties them to storage.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Which persistent store mirrors a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Survives reloads of the same tab, never shared across tabs.
    #[default]
    Tab,
    /// Survives across sessions.
    Local,
}

impl StoreKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "tab",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tab" | "session" | "tab-scoped" => Ok(Self::Tab),
            "local" => Ok(Self::Local),
            other => Err(ModelError::UnknownStore(other.to_string())),
        }
    }
}

/// Where a field persists and how its commits are timed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldBinding {
    /// Query-string parameter name and store entry name.
    pub key: String,
    /// Coordination group whose members get staggered commit times.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub store: StoreKind,
    /// Overrides the coordinator's base debounce delay for this field.
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl FieldBinding {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            group: None,
            store: StoreKind::default(),
            delay_ms: None,
        }
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    /// Reject bindings that could never round-trip through the query string.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(ModelError::EmptyKey);
        }
        if self.group.as_deref().is_some_and(|g| g.trim().is_empty()) {
            return Err(ModelError::EmptyGroup {
                key: self.key.clone(),
            });
        }
        Ok(())
    }
}

/// A live/committed pair for one control.
///
/// `live` follows every user input. `committed` only changes when the
/// coordinator fires for this field, so anything downstream of `committed`
/// sees debounced values.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedField<T> {
    pub live: T,
    pub committed: T,
    pub binding: FieldBinding,
}

impl<T: Clone> PersistedField<T> {
    /// Create a field whose live and committed halves both start at `initial`.
    pub fn new(initial: T, binding: FieldBinding) -> Self {
        Self {
            live: initial.clone(),
            committed: initial,
            binding,
        }
    }
}

impl<T> PersistedField<T> {
    #[inline]
    pub fn key(&self) -> &str {
        &self.binding.key
    }
}

impl<T: PartialEq> PersistedField<T> {
    /// A change is in flight while live and committed disagree.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.live != self.committed
    }
}
