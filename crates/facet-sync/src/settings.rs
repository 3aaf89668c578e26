//! Commit timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing for debounced commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Debounce delay in milliseconds.
    ///
    /// After a change, the field commits once this long has passed without
    /// further changes to it. There is no maximum wait.
    pub debounce_ms: u64,

    /// Extra delay per arrival index inside a coordination group.
    pub stagger_step_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stagger_step_ms: 50,
        }
    }
}

impl SyncSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn stagger_step(&self) -> Duration {
        Duration::from_millis(self.stagger_step_ms)
    }

    /// Effective delay for a field at `offset_index` in its group.
    pub fn delay(&self, base: Duration, offset_index: usize) -> Duration {
        let steps = u32::try_from(offset_index).unwrap_or(u32::MAX);
        base.saturating_add(self.stagger_step().saturating_mul(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SyncSettings::default();
        assert_eq!(settings.debounce(), Duration::from_millis(500));
        assert_eq!(settings.stagger_step(), Duration::from_millis(50));
    }

    #[test]
    fn test_delay_adds_stagger_steps() {
        let settings = SyncSettings::default();
        let base = settings.debounce();
        assert_eq!(settings.delay(base, 0), Duration::from_millis(500));
        assert_eq!(settings.delay(base, 2), Duration::from_millis(600));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: SyncSettings = serde_json::from_str(r#"{"debounce_ms":300}"#).unwrap();
        assert_eq!(settings.debounce_ms, 300);
        assert_eq!(settings.stagger_step_ms, 50);
    }
}
