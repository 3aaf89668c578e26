//! Debounced synchronization of live field values into persistence.
//!
//! A field's live value changes on every keystroke; its committed value
//! (and the query string and store mirrors) only changes once the field has
//! been quiet for the debounce window. Fields that belong to one logical
//! filter or sort domain share a coordination group, and each member's
//! window is offset by its arrival index in that group so their commits
//! land in a fixed order instead of on the same tick.
//!
//! Time is always passed in explicitly as a [`std::time::Instant`]: the
//! coordinator holds deadlines, and whoever drives it (a UI tick, the
//! tokio [`driver`], a test) decides when "now" is.
//!
//! # Architecture
//!
//! - `stagger.rs` - `StaggerRegistry`, per-group arrival indices
//! - `coordinator.rs` - `SyncCoordinator` and `Commit`
//! - `settings.rs` - `SyncSettings` (debounce and stagger step)
//! - `driver.rs` - Async helper that sleeps until each deadline
//! - `error.rs` - Error types

mod coordinator;
pub mod driver;
mod error;
mod settings;
mod stagger;

pub use coordinator::{Commit, SyncCoordinator};
pub use error::{Result, SyncError};
pub use settings::SyncSettings;
pub use stagger::StaggerRegistry;
