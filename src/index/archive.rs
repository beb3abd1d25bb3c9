//! Zip packing and unpacking for the index directory tree.
//!
//! Archive entry names are relative to the index root, so a bundle produced on
//! one deployment restores cleanly on another regardless of the configured
//! `INDEX_DIR`.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::types::IndexError;

/// Pack the directory at `root` into an in-memory zip archive.
pub(crate) fn pack_directory(root: &Path) -> Result<Vec<u8>, IndexError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if root.exists() {
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|error| {
                IndexError::Io(io::Error::other(format!(
                    "failed to walk index tree: {error}"
                )))
            })?;
            let path = entry.path();
            let relative = path.strip_prefix(root).map_err(|_| {
                IndexError::Io(io::Error::other("index entry escaped the index root"))
            })?;
            if relative.as_os_str().is_empty() {
                continue;
            }
            let name = relative.to_string_lossy().replace('\\', "/");

            if path.is_dir() {
                zip.add_directory(name, options)?;
            } else {
                zip.start_file(name, options)?;
                let mut file = File::open(path)?;
                io::copy(&mut file, &mut zip)?;
            }
        }
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Unpack an archive produced by [`pack_directory`] into `root`.
///
/// Entries whose names would escape `root` are skipped.
pub(crate) fn unpack_into(root: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(relative) = file.enclosed_name() else {
            tracing::warn!(name = %file.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let destination = root.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&destination)?;
            io::copy(&mut file, &mut out)?;
        }
    }

    Ok(())
}
