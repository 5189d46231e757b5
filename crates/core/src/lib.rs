//! Core types shared across the pngtrim workspace
//!
//! This crate provides the pieces every other crate builds on:
//!
//! - **Error handling**: coded errors with context, suggestions and an HTTP mapping
//! - **Configuration**: TOML configuration with environment overrides and validation
//! - **Naming**: output filename policies shared by the server and the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use pngtrim_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("listening on {}", config.schema.server.bind_addr());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod naming;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, EmptyImagePolicy, PackagingMode};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
}
