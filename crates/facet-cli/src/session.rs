//! A saved tab: address bar plus tab-scoped store.
//!
//! Replaying with the same session file twice simulates a reload: the
//! second run mounts from whatever the first one left behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use facet_persist::{KeyValueStore, MemoryLocation, MemoryStore, Sinks};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub url: String,
    #[serde(default)]
    pub tab_store: BTreeMap<String, String>,
}

impl Session {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tab_store: BTreeMap::new(),
        }
    }

    /// Read a session file. A missing file is `None`; an unreadable one is
    /// logged and also `None`, so the run starts from a fresh tab.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read session, starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(session) => {
                tracing::debug!(path = %path.display(), "loaded session");
                Some(session)
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to parse session, starting fresh");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("serialize session")?;
        fs::write(path, content).with_context(|| format!("write session to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Sinks for this tab, with `local` as the cross-session store.
    pub fn into_sinks(self, local: Box<dyn KeyValueStore>) -> Sinks {
        Sinks::new(
            Box::new(MemoryLocation::new(&self.url)),
            Box::new(MemoryStore::from_entries(self.tab_store)),
            local,
        )
    }

    /// Capture the current state of `sinks`.
    pub fn capture(sinks: &Sinks) -> Self {
        Self {
            url: sinks.location.href(),
            tab_store: sinks.tab.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_then_into_sinks_restores_tab() {
        let mut sinks = Sinks::in_memory("/catalog?page=2");
        sinks.tab.set("tags", "[\"red\"]").unwrap();

        let session = Session::capture(&sinks);
        assert_eq!(session.url, "/catalog?page=2");

        let restored = session.into_sinks(Box::new(MemoryStore::new()));
        assert_eq!(restored.location.href(), "/catalog?page=2");
        assert_eq!(restored.tab.get("tags").as_deref(), Some("[\"red\"]"));
        assert_eq!(restored.location.history_len(), 1);
    }

    #[test]
    fn missing_file_is_none() {
        assert_eq!(Session::load(Path::new("/nonexistent/facetsync-session.json")), None);
    }
}
