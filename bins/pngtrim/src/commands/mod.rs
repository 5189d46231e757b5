//! Subcommand implementations.

#[cfg(feature = "serve")]
pub mod serve;
pub mod trim;
