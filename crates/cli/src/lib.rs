//! Terminal helpers for the pngtrim command line
//!
//! - Colored status lines
//! - Human-readable sizes, durations and dimensions
//! - Progress bars for batch trimming

#![warn(missing_docs)]

pub mod output;
pub mod progress;
