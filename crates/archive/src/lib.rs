//! Zip bundling for pngtrim.
//!
//! Entries are written in the order given and stored without
//! recompression, since PNG data is already deflate-compressed.

mod bundle;
mod error;

pub use bundle::{bundle, entry_names, read_entry, validate_entry_name, ARCHIVE_MIME};
pub use error::{ArchiveError, Result};
