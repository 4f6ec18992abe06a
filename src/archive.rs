//! CBZ container reading and writing.
//!
//! A CBZ is a plain ZIP archive of page images. Unpacking flattens any
//! internal directory structure: only the final path component of each
//! member survives, since page order is defined by filename alone.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::MergeError;

/// Unpacks a single CBZ into its own subdirectory of `workdir`, named after
/// the archive with the extension stripped. Returns the subdirectory path.
///
/// The whole archive is rejected with [`MergeError::UnreadableArchive`] if
/// the container cannot be parsed; no partially extracted state is handed
/// to later stages.
pub fn unpack(cbz_path: &Path, workdir: &Path) -> Result<PathBuf, MergeError> {
    let stem = cbz_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let subdir = workdir.join(stem);
    fs::create_dir_all(&subdir)?;

    let file = File::open(cbz_path)?;
    let mut archive = ZipArchive::new(file).map_err(|source| MergeError::UnreadableArchive {
        path: cbz_path.to_path_buf(),
        source,
    })?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|source| MergeError::UnreadableArchive {
                path: cbz_path.to_path_buf(),
                source,
            })?;

        if entry.is_dir() {
            continue;
        }

        // Flatten: keep the final path component only.
        let name = match Path::new(entry.name()).file_name() {
            Some(name) => name.to_os_string(),
            None => continue,
        };

        let dest_path = subdir.join(name);
        let mut dest = File::create(&dest_path)?;
        io::copy(&mut entry, &mut dest)?;
        debug!("Extracted {}", dest_path.display());
    }

    Ok(subdir)
}

/// Writes the staged page files into a new deflate-compressed CBZ at
/// `output`, in the order given. Entry names are the staged filenames with
/// no directory structure.
pub fn write(pages: &[PathBuf], output: &Path) -> Result<(), MergeError> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in pages {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        writer.start_file(name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}
