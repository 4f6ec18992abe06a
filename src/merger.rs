//! Pipeline driver: unpack, renumber, stage, write, clean up.

use colored::*;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::archive;
use crate::error::MergeError;
use crate::pdf_export;
use crate::renumber;

const ARCHIVE_EXTENSION: &str = ".cbz";
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Cbz,
    Pdf,
}

/// What a completed merge produced.
#[derive(Debug)]
pub struct MergeSummary {
    pub output_path: PathBuf,
    pub page_count: usize,
}

/// Merges every `.cbz` in an input directory into a single output artifact,
/// renumbering pages sequentially across archive boundaries.
pub struct CbzMerger {
    input_dir: PathBuf,
    output_file: PathBuf,
    mode: OutputMode,
}

impl CbzMerger {
    pub fn new(input_dir: PathBuf, output_file: PathBuf, mode: OutputMode) -> Self {
        Self {
            input_dir,
            output_file,
            mode,
        }
    }

    /// Runs the whole merge. Working storage lives in a temporary directory
    /// that is removed when this function returns, on success and on every
    /// failure path alike.
    pub fn run(&self) -> Result<MergeSummary, MergeError> {
        let archives = self.collect_archives()?;
        if archives.is_empty() {
            return Err(MergeError::EmptyInputSet(self.input_dir.clone()));
        }
        self.check_output_writable()?;

        let workdir = TempDir::new()?;
        let merge_dir = workdir.path().join("merged");
        fs::create_dir_all(&merge_dir)?;

        info!(
            "Unpacking {} CBZ files from {}",
            archives.len(),
            self.input_dir.display().to_string().green()
        );

        let mut page_lists = Vec::with_capacity(archives.len());
        for cbz_path in &archives {
            info!("Unpacking {}", cbz_path.display().to_string().green());
            let subdir = archive::unpack(cbz_path, workdir.path())?;
            page_lists.push(list_page_files(&subdir)?);
        }

        info!("Renumbering pages across {} archives", archives.len());
        let assignments = renumber::renumber_all(&page_lists)?;

        let mut staged = Vec::with_capacity(assignments.len());
        for (new_name, source) in &assignments {
            let dest = merge_dir.join(new_name);
            fs::copy(source, &dest)?;
            debug!("Staged {} as {}", source.display(), new_name);
            staged.push(dest);
        }

        // Write next to the destination, then rename into place, so the
        // target path never holds a partial file.
        let staging = staging_path(&self.output_file);
        let written = match self.mode {
            OutputMode::Cbz => {
                info!("Writing merged CBZ with {} pages", staged.len());
                archive::write(&staged, &staging)
            }
            OutputMode::Pdf => pdf_export::export(&staged, &staging),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, &self.output_file)?;

        Ok(MergeSummary {
            output_path: self.output_file.clone(),
            page_count: staged.len(),
        })
    }

    /// Lists the `.cbz` files (case-sensitive extension, non-recursive) in
    /// the input directory, sorted by filename.
    fn collect_archives(&self) -> Result<Vec<PathBuf>, MergeError> {
        let entries = fs::read_dir(&self.input_dir).map_err(|source| MergeError::UnreadableInput {
            path: self.input_dir.clone(),
            source,
        })?;

        let mut archives = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MergeError::UnreadableInput {
                path: self.input_dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_cbz = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ARCHIVE_EXTENSION));
            if is_cbz && path.is_file() {
                archives.push(path);
            }
        }

        archives.sort();
        Ok(archives)
    }

    fn check_output_writable(&self) -> Result<(), MergeError> {
        let parent = match self.output_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(MergeError::UnwritableOutput(self.output_file.clone()));
        }
        Ok(())
    }
}

fn staging_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".part");
    output.with_file_name(name)
}

/// Lists the image files in one unpacked archive directory, sorted by
/// filename. Non-image members are filtered out by a case-insensitive
/// extension allow-list.
fn list_page_files(dir: &Path) -> Result<Vec<PathBuf>, MergeError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .is_some_and(|name| IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)));
        if is_image {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_is_a_sibling_of_the_output() {
        assert_eq!(
            staging_path(Path::new("/tmp/out/merged.cbz")),
            PathBuf::from("/tmp/out/merged.cbz.part")
        );
        assert_eq!(
            staging_path(Path::new("merged.pdf")),
            PathBuf::from("merged.pdf.part")
        );
    }
}
