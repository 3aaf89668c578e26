//! Persistence sinks and value resolution for facet state.
//!
//! Every tracked field is mirrored into two places under one persistence
//! key: the document's query string (shareable, bookmarkable) and a
//! persistent store (tab-scoped by default). This crate owns both sinks,
//! the URL builder that edits the query string, and the resolver that reads
//! a field's initial value back out of them.
//!
//! # Entry format
//!
//! | Entry            | Query string       | Store            |
//! |------------------|--------------------|------------------|
//! | `Value(v)`       | `key=<json of v>`  | `<json of v>`    |
//! | `Cleared`        | `key=`             | empty string     |
//! | `Unset`          | key absent         | entry removed    |
//!
//! The resolver treats `Cleared`, `Unset`, malformed JSON and values of the
//! wrong shape identically: as absent.
//!
//! # Architecture
//!
//! - `query.rs` - Ordered query-string parameters
//! - `url_builder.rs` - `build_url` and `UrlOverrides`
//! - `location.rs` - The document location sink
//! - `store.rs` - Key/value stores (memory and file backed)
//! - `sinks.rs` - The bundle the coordinator writes to
//! - `codec.rs` - Encoding field values into entries
//! - `resolve.rs` - Initial value resolution
//! - `error.rs` - Error types with user-facing messages

mod codec;
mod error;
mod location;
mod query;
mod resolve;
mod sinks;
mod store;
mod url_builder;

pub use codec::PersistValue;
pub use error::{PersistError, Result};
pub use location::{Location, MemoryLocation, split_url};
pub use query::QueryParams;
pub use resolve::{ResolveOptions, Resolved, ResolvedFrom, Resolver, parse_entry};
pub use sinks::Sinks;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use url_builder::{UrlOverrides, build_url, join_url};
