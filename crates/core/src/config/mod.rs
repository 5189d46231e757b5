//! Configuration loading and schema definitions
//!
//! Values are resolved in order: defaults, TOML file, `PNGTRIM_*`
//! environment variables, then command-line flags (applied by the binary).

mod loader;
mod schema;

pub use loader::{apply_env_overrides, Config};
pub use schema::*;
