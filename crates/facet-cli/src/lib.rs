//! Library components for the `facetsync` command line tool.
//!
//! The binary only parses arguments and prints tables; everything it runs
//! lives here so the integration tests can drive it directly.
//!
//! - `logging.rs` - Subscriber setup
//! - `settings.rs` - TOML settings in the platform config directory
//! - `session.rs` - A saved tab (URL plus tab store) for simulated reloads
//! - `script.rs` - Timed panel commands
//! - `replay.rs` - Driving a mounted panel through a script

pub mod logging;
pub mod replay;
pub mod script;
pub mod session;
pub mod settings;
