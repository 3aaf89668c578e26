//! Sort direction and activation rank.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Direction of one sortable field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Field does not take part in the sort.
    #[default]
    #[serde(rename = "none")]
    Off,
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn all() -> &'static [SortDirection] {
        &[Self::Off, Self::Ascending, Self::Descending]
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Next direction in the click cycle: none -> ascending -> descending -> none.
    pub const fn cycle(self) -> Self {
        match self {
            Self::Off => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Off,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "none",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::Off),
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ModelError::UnknownDirection(other.to_string())),
        }
    }
}

/// One field of a ranked toggle group.
///
/// `rank` is the activation order among the currently active fields and
/// doubles as sort precedence (0 = primary key). It is `None` exactly when
/// the direction is [`SortDirection::Off`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedEntry {
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub rank: Option<usize>,
}

impl RankedEntry {
    pub const fn inactive() -> Self {
        Self {
            direction: SortDirection::Off,
            rank: None,
        }
    }

    pub const fn active(direction: SortDirection, rank: usize) -> Self {
        Self {
            direction,
            rank: Some(rank),
        }
    }

    /// Active entries are the ones with a direction and a finite rank.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.direction.is_active() && self.rank.is_some()
    }
}

/// Which half of a live/committed pair an action targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    #[default]
    Live,
    Committed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_cycle_wraps() {
        assert_eq!(SortDirection::Off.cycle(), SortDirection::Ascending);
        assert_eq!(SortDirection::Ascending.cycle(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.cycle(), SortDirection::Off);
    }

    #[test]
    fn direction_parses_aliases() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Ascending));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert_eq!("none".parse::<SortDirection>(), Ok(SortDirection::Off));
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn inactive_entry_has_no_rank() {
        let entry = RankedEntry::inactive();
        assert!(!entry.is_active());
        assert_eq!(entry.rank, None);
    }
}
