//! Zip bundle writer and reader.

use crate::{ArchiveError, Result};
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// MIME type of a bundle.
pub const ARCHIVE_MIME: &str = "application/zip";

/// Write `(path, data)` pairs into an in-memory zip archive.
///
/// Entry order in the archive's central directory follows iteration order.
/// Paths must be unique and relative.
///
/// # Example
/// ```
/// let archive = pngtrim_archive::bundle([("a.png", &b"one"[..]), ("b.png", &b"two"[..])]).unwrap();
/// assert_eq!(pngtrim_archive::entry_names(&archive).unwrap(), ["a.png", "b.png"]);
/// ```
pub fn bundle<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen = HashSet::new();

    for (name, data) in entries {
        validate_entry_name(name)?;
        if !seen.insert(name) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file(name, options)?;
        writer.write_all(data)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Reject paths a zip extractor could resolve outside its target directory.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|segment| segment == "..");

    if invalid {
        return Err(ArchiveError::InvalidEntryName(name.to_string()));
    }
    Ok(())
}

/// Entry paths in central-directory order.
pub fn entry_names(archive: &[u8]) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut names = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        names.push(archive.by_index(index)?.name().to_string());
    }
    Ok(names)
}

/// Read one entry's contents.
pub fn read_entry(archive: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut file = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => ArchiveError::EntryNotFound(name.to_string()),
        other => ArchiveError::Zip(other),
    })?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}
