//! # cbzmerge
//!
//! A CLI utility to merge multiple CBZ comic archives into a single CBZ or
//! PDF file.
//!
//! ## Current Features
//!
//! - Merges every `.cbz` in a directory, in filename order
//! - Renumbers pages sequentially across archive boundaries
//! - Preserves double-page spread names (`18-19.jpg` stays one entry)
//! - CBZ or PDF output
//!
//! ## Usage
//!
//! ```bash
//! cbzmerge ./volumes merged.cbz
//! cbzmerge ./volumes merged.pdf --pdf
//! ```

mod archive;
mod error;
mod merger;
mod pdf_export;
mod renumber;

pub use error::MergeError;
pub use merger::{CbzMerger, MergeSummary, OutputMode};
pub use renumber::{classify, PageKind};
