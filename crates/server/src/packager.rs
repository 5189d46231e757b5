//! Response shape selection.
//!
//! | items | archive mode | inline mode |
//! |-------|--------------|-------------|
//! | 1     | `SingleFile` | `SingleFile` |
//! | > 1   | `Bundle`     | `InlineList` |

use crate::batch::ProcessedItem;
use base64::Engine as _;
use pngtrim_core::config::{PackagingConfig, PackagingMode};
use pngtrim_core::naming::disambiguate;
use pngtrim_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// One element of an inline JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineEntry {
    /// Output filename
    pub name: String,
    /// Base64 (standard alphabet, padded) PNG bytes
    pub data: String,
}

/// What the emitter turns into an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    /// Exactly one image, sent as a PNG attachment
    SingleFile {
        /// Attachment filename
        name: String,
        /// PNG bytes
        bytes: Vec<u8>,
    },
    /// Zip archive of every image
    Bundle {
        /// Attachment filename
        file_name: String,
        /// Zip bytes
        archive: Vec<u8>,
    },
    /// Base64-encoded images in a JSON array
    InlineList {
        /// Entries in upload order
        items: Vec<InlineEntry>,
    },
}

impl ProcessingResult {
    /// Short label for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            ProcessingResult::SingleFile { .. } => "single_file",
            ProcessingResult::Bundle { .. } => "bundle",
            ProcessingResult::InlineList { .. } => "inline_list",
        }
    }
}

/// Chooses and builds the response shape.
#[derive(Debug, Clone)]
pub struct Packager {
    mode: PackagingMode,
    archive_name: String,
}

impl Packager {
    /// Create a packager.
    pub fn new(mode: PackagingMode, archive_name: impl Into<String>) -> Self {
        Self {
            mode,
            archive_name: archive_name.into(),
        }
    }

    /// Create a packager from the `[packaging]` section.
    pub fn from_config(config: &PackagingConfig) -> Self {
        Self::new(config.mode, config.archive_name.clone())
    }

    /// Shape used for batches of more than one image.
    pub fn mode(&self) -> PackagingMode {
        self.mode
    }

    /// Package processed items.
    ///
    /// An empty batch cannot come out of intake, so it is an internal error.
    pub fn pack(&self, items: Vec<ProcessedItem>) -> Result<ProcessingResult> {
        if items.is_empty() {
            return Err(Error::internal("Nothing to package: batch produced no images"));
        }

        let items = match <[ProcessedItem; 1]>::try_from(items) {
            Ok([item]) => {
                return Ok(ProcessingResult::SingleFile {
                    name: item.name,
                    bytes: item.bytes,
                });
            }
            Err(items) => items,
        };

        match self.mode {
            PackagingMode::Archive => self.bundle(&items),
            PackagingMode::Inline => Ok(inline(items)),
        }
    }

    fn bundle(&self, items: &[ProcessedItem]) -> Result<ProcessingResult> {
        let mut names: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
        disambiguate(&mut names);

        let archive = pngtrim_archive::bundle(
            names
                .iter()
                .map(String::as_str)
                .zip(items.iter().map(|item| item.bytes.as_slice())),
        )?;

        Ok(ProcessingResult::Bundle {
            file_name: self.archive_name.clone(),
            archive,
        })
    }
}

fn inline(items: Vec<ProcessedItem>) -> ProcessingResult {
    let engine = base64::engine::general_purpose::STANDARD;
    ProcessingResult::InlineList {
        items: items
            .into_iter()
            .map(|item| InlineEntry {
                data: engine.encode(&item.bytes),
                name: item.name,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pngtrim_core::ErrorCode;

    fn item(name: &str, bytes: &[u8]) -> ProcessedItem {
        ProcessedItem {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_empty_batch_is_internal_error() {
        let packager = Packager::new(PackagingMode::Archive, "out.zip");
        let err = packager.pack(Vec::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_single_item_is_single_file_in_both_modes() {
        for mode in [PackagingMode::Archive, PackagingMode::Inline] {
            let packager = Packager::new(mode, "out.zip");
            let result = packager.pack(vec![item("a-processed.png", b"png")]).unwrap();
            assert_eq!(
                result,
                ProcessingResult::SingleFile {
                    name: "a-processed.png".to_string(),
                    bytes: b"png".to_vec()
                }
            );
        }
    }

    #[test]
    fn test_archive_mode_bundles_in_order() {
        let packager = Packager::new(PackagingMode::Archive, "processed-images.zip");
        let result = packager
            .pack(vec![item("c.png", b"3"), item("a.png", b"1"), item("b.png", b"2")])
            .unwrap();

        let ProcessingResult::Bundle { file_name, archive } = result else {
            panic!("expected a bundle, got {}", result.shape());
        };
        assert_eq!(file_name, "processed-images.zip");
        assert_eq!(
            pngtrim_archive::entry_names(&archive).unwrap(),
            ["c.png", "a.png", "b.png"]
        );
        assert_eq!(pngtrim_archive::read_entry(&archive, "a.png").unwrap(), b"1");
    }

    #[test]
    fn test_archive_mode_renames_duplicates() {
        let packager = Packager::new(PackagingMode::Archive, "out.zip");
        let result = packager
            .pack(vec![item("a.png", b"1"), item("a.png", b"2")])
            .unwrap();

        let ProcessingResult::Bundle { archive, .. } = result else {
            panic!("expected a bundle");
        };
        assert_eq!(pngtrim_archive::entry_names(&archive).unwrap(), ["a.png", "a-2.png"]);
        assert_eq!(pngtrim_archive::read_entry(&archive, "a-2.png").unwrap(), b"2");
    }

    #[test]
    fn test_inline_mode_encodes_in_order() {
        let packager = Packager::new(PackagingMode::Inline, "out.zip");
        let result = packager
            .pack(vec![item("x-processed.png", b"hello"), item("y-processed.png", b"\x00\xff")])
            .unwrap();

        let ProcessingResult::InlineList { items } = result else {
            panic!("expected an inline list");
        };
        assert_eq!(items[0].name, "x-processed.png");
        assert_eq!(items[0].data, "aGVsbG8=");
        assert_eq!(items[1].name, "y-processed.png");
        assert_eq!(items[1].data, "AP8=");
    }
}
