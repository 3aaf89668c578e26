//! Scripted UI gestures for `facetsync replay`.
//!
//! ```json
//! { "steps": [
//!     { "at_ms": 0,   "command": { "type": "set_scalar", "field": "minPrice", "value": 10 } },
//!     { "at_ms": 100, "command": { "type": "set_scalar", "field": "maxPrice", "value": 5 } }
//! ] }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use facet_state::PanelCommand;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Offset from the start of the replay.
    #[serde(default)]
    pub at_ms: u64,
    pub command: PanelCommand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script. Steps are ordered by `at_ms`; steps at the same
    /// offset keep their file order.
    pub fn parse(content: &str) -> Result<Self> {
        let mut script: Self = serde_json::from_str(content).context("parse replay script")?;
        script.steps.sort_by_key(|step| step.at_ms);
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read replay script {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map_or(0, |step| step.at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_by_offset() {
        let script = Script::parse(
            r#"{"steps": [
                {"at_ms": 300, "command": {"type": "reset_filters"}},
                {"command": {"type": "clear_scalar", "field": "q"}},
                {"at_ms": 300, "command": {"type": "reset_selection", "field": "status"}}
            ]}"#,
        )
        .unwrap();
        let offsets: Vec<_> = script.steps.iter().map(|step| step.at_ms).collect();
        assert_eq!(offsets, [0, 300, 300]);
        assert_eq!(script.steps[1].command, PanelCommand::ResetFilters);
        assert_eq!(script.duration_ms(), 300);
    }

    #[test]
    fn unknown_command_is_an_error() {
        let error = Script::parse(r#"{"steps": [{"command": {"type": "explode"}}]}"#).unwrap_err();
        assert!(format!("{error:#}").contains("parse replay script"));
    }
}
