//! Value types for the filter/sort synchronization engine.
//!
//! Everything here is plain data: the three-state persisted entry, the
//! sort direction and rank pair, scalar filter values, and the binding that
//! ties a field to its persistence key and coordination group.

pub mod error;
pub mod field;
pub mod scalar;
pub mod sort;
pub mod tristate;

pub use error::{ModelError, Result};
pub use field::{FieldBinding, PersistedField, StoreKind};
pub use scalar::{FieldKind, ScalarValue};
pub use sort::{Half, RankedEntry, SortDirection};
pub use tristate::Tristate;
