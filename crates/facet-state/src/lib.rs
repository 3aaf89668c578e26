//! State machines for filter and sort controls, and the panel that composes them.
//!
//! Each control owns a live/committed pair. Commands mutate the live half
//! immediately; the committed half only moves when the coordinator fires and
//! the owner routes the [`facet_sync::Commit`] back as a commit command.
//!
//! # Architecture
//!
//! Every state machine implements [`Reducer`] over its own closed command
//! enum:
//!
//! ```ignore
//! let mut tags = SelectionSet::new(FieldBinding::new("tags"));
//! tags.dispatch(SelectionCommand::Add("red".into()));
//! ```
//!
//! - `reducer.rs` - The `Reducer` dispatch trait
//! - `scalar.rs` - `ScalarField` (numbers, text, flags)
//! - `selection.rs` - `SelectionSet` (tag pickers)
//! - `ranked.rs` - `RankedToggleState` (multi-field sort)
//! - `config.rs` - `PanelConfig` and the built-in presets
//! - `panel.rs` - `FilterPanel`, `PanelCommand`, `SearchQuery`
//! - `error.rs` - Error types

mod config;
mod error;
mod panel;
mod ranked;
mod reducer;
mod scalar;
mod selection;

pub use config::{PanelConfig, ScalarSpec, SelectionSpec, SortSpec};
pub use error::{Result, StateError};
pub use panel::{FilterPanel, PanelCommand, SearchQuery, SortKey};
pub use ranked::{RankMap, RankedToggleCommand, RankedToggleState, ranks_are_contiguous};
pub use reducer::Reducer;
pub use scalar::{ScalarCommand, ScalarField};
pub use selection::{SelectionCommand, SelectionSet};
