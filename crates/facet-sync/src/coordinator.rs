//! Trailing-edge debounced commits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use facet_model::{FieldBinding, Tristate};
use facet_persist::{PersistValue, Sinks, parse_entry};
use serde::de::DeserializeOwned;

use crate::error::{Result, SyncError};
use crate::settings::SyncSettings;
use crate::stagger::StaggerRegistry;

/// A fired commit, handed back to the field's owner.
///
/// By the time the owner sees it, `entry` has already been written to the
/// query string and the field's store; the owner's job is to copy the value
/// into its committed half.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub binding: FieldBinding,
    pub entry: Tristate<String>,
    /// When the commit was due.
    pub deadline: Instant,
    pub fired_at: Instant,
}

impl Commit {
    #[inline]
    pub fn key(&self) -> &str {
        &self.binding.key
    }

    /// Decode the committed value. `Unset` and `Cleared` decode to `None`.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        match &self.entry {
            Tristate::Value(raw) => parse_entry(Some(raw), false),
            Tristate::Unset | Tristate::Cleared => None,
        }
    }

    /// Decode a three-state field, keeping the cleared/unset distinction.
    pub fn decode_tristate<T: DeserializeOwned>(&self) -> Tristate<T> {
        match &self.entry {
            Tristate::Value(raw) => match parse_entry(Some(raw), false) {
                Some(value) => Tristate::Value(value),
                None => Tristate::Unset,
            },
            Tristate::Cleared => Tristate::Cleared,
            Tristate::Unset => Tristate::Unset,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingCommit {
    binding: FieldBinding,
    entry: Tristate<String>,
    deadline: Instant,
    seq: u64,
}

/// Holds one pending commit per persistence key.
///
/// Every `schedule` for a key replaces its pending commit and pushes the
/// deadline out again, so only the last value of a burst is written.
/// Nothing fires on its own: the driver calls [`SyncCoordinator::poll`].
#[derive(Debug)]
pub struct SyncCoordinator {
    registry: Arc<StaggerRegistry>,
    settings: SyncSettings,
    pending: HashMap<String, PendingCommit>,
    next_seq: u64,
}

impl SyncCoordinator {
    pub fn new(registry: Arc<StaggerRegistry>, settings: SyncSettings) -> Self {
        Self {
            registry,
            settings,
            pending: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<StaggerRegistry> {
        &self.registry
    }

    /// Claim a stagger slot for `binding` without scheduling anything.
    ///
    /// Owners call this at mount, in declaration order, so slot order does
    /// not depend on which field the user happens to touch first.
    pub fn register(&self, binding: &FieldBinding) -> usize {
        match &binding.group {
            Some(group) => self.registry.offset_index_for(group, &binding.key),
            None => 0,
        }
    }

    /// Debounce window for `binding`, including its stagger offset.
    pub fn delay_for(&self, binding: &FieldBinding) -> Duration {
        let base = binding.delay().unwrap_or_else(|| self.settings.debounce());
        self.settings.delay(base, self.register(binding))
    }

    /// Arm (or re-arm) the commit for one field.
    ///
    /// When `live` equals `committed` there is nothing to write: any pending
    /// commit for the key is cancelled and `None` is returned. Otherwise the
    /// returned instant is the new deadline.
    pub fn schedule<T: PersistValue>(
        &mut self,
        now: Instant,
        binding: &FieldBinding,
        live: &T,
        committed: &T,
    ) -> Result<Option<Instant>> {
        if live == committed {
            if self.pending.remove(&binding.key).is_some() {
                tracing::debug!(key = %binding.key, "live value settled back, commit cancelled");
            }
            return Ok(None);
        }

        let entry = live.to_entry().map_err(|source| SyncError::Encode {
            key: binding.key.clone(),
            source,
        })?;
        let delay = self.delay_for(binding);
        let deadline = now + delay;
        let seq = self.next_seq;
        self.next_seq += 1;

        let rearmed = self
            .pending
            .insert(
                binding.key.clone(),
                PendingCommit {
                    binding: binding.clone(),
                    entry,
                    deadline,
                    seq,
                },
            )
            .is_some();
        tracing::debug!(
            key = %binding.key,
            delay_ms = delay.as_millis() as u64,
            rearmed,
            "commit scheduled"
        );
        Ok(Some(deadline))
    }

    /// Drop the pending commit for `key` (the owning control unmounted).
    pub fn cancel(&mut self, key: &str) -> bool {
        let cancelled = self.pending.remove(key).is_some();
        if cancelled {
            tracing::debug!(key, "pending commit cancelled");
        }
        cancelled
    }

    pub fn cancel_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> usize {
        keys.into_iter().filter(|key| self.cancel(key)).count()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline, if anything is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Fire every commit whose deadline is at or before `now`.
    ///
    /// Commits fire in deadline order (ties in arming order). Each one
    /// re-reads the query string, so staggered siblings build on each
    /// other's writes.
    pub fn poll(&mut self, now: Instant, sinks: &mut Sinks) -> Vec<Commit> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        self.fire(due, now, sinks)
    }

    /// Fire everything that is pending, regardless of deadline.
    pub fn flush(&mut self, now: Instant, sinks: &mut Sinks) -> Vec<Commit> {
        let all: Vec<String> = self.pending.keys().cloned().collect();
        self.fire(all, now, sinks)
    }

    fn fire(&mut self, keys: Vec<String>, now: Instant, sinks: &mut Sinks) -> Vec<Commit> {
        let mut batch: Vec<PendingCommit> = keys
            .into_iter()
            .filter_map(|key| self.pending.remove(&key))
            .collect();
        batch.sort_by_key(|p| (p.deadline, p.seq));

        batch
            .into_iter()
            .map(|pending| {
                if let Err(error) = sinks.write_entry(&pending.binding, &pending.entry) {
                    tracing::warn!(
                        key = %pending.binding.key,
                        store = %pending.binding.store,
                        %error,
                        "store write failed, keeping commit"
                    );
                }
                tracing::info!(key = %pending.binding.key, "committed");
                tracing::trace!(key = %pending.binding.key, entry = ?pending.entry, "committed entry");
                Commit {
                    binding: pending.binding,
                    entry: pending.entry,
                    deadline: pending.deadline,
                    fired_at: now,
                }
            })
            .collect()
    }
}
