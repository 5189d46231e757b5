//! Upload pipeline for pngtrim
//!
//! A request flows through four stages, each in its own module:
//!
//! ```text
//! intake  →  batch  →  packager  →  emitter
//! (multipart)  (trim)   (shape)      (HTTP response)
//! ```
//!
//! [`routes`] wires the stages to axum handlers. Configuration is read once
//! into an immutable [`AppState`]; nothing is shared between requests
//! except that state and the telemetry registry.

#![warn(missing_docs)]

pub mod batch;
pub mod emitter;
pub mod error;
pub mod intake;
pub mod packager;
pub mod routes;

pub use batch::{BatchProcessor, ProcessedItem};
pub use error::ApiError;
pub use intake::UploadedItem;
pub use pngtrim_core::naming::NamingPolicy;
pub use packager::{InlineEntry, Packager, ProcessingResult};
pub use routes::{router, AppState};
