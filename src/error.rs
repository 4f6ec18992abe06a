use std::io;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

/// Errors produced by the merge pipeline. Every variant is fatal to the
/// whole merge; there is no partial-success mode.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot read input directory {path}: {source}")]
    UnreadableInput { path: PathBuf, source: io::Error },

    #[error("{path} is not a readable CBZ archive: {source}")]
    UnreadableArchive { path: PathBuf, source: ZipError },

    #[error("no .cbz files found in {0}")]
    EmptyInputSet(PathBuf),

    #[error("no pages to export")]
    EmptyPageSet,

    #[error("duplicate output page name {0}")]
    RenumberingConflict(String),

    #[error("output location {0} is not writable")]
    UnwritableOutput(PathBuf),

    #[error("cannot decode page image {path}: {source}")]
    UndecodablePage {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write output archive: {0}")]
    ArchiveWrite(#[from] ZipError),

    #[error("failed to assemble PDF: {0}")]
    PdfWrite(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
