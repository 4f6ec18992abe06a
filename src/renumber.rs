//! Page classification and sequential renumbering.
//!
//! A double-page spread is encoded in the source filename as two 2-4 digit
//! numbers separated by a hyphen, e.g. `18-19.jpg`. The pattern matches the
//! `.jpg` extension only (case-sensitive); a `.jpeg` or `.png` spread is
//! treated as a single page. This mirrors the behavior of the original tool
//! and is a known limitation, as is the fixed 2-digit zero padding of the
//! output names, which stops sorting lexicographically past page 99.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::MergeError;

lazy_static! {
    static ref DOUBLE_PAGE: Regex = Regex::new(r"^(\d{2,4})-(\d{2,4})\.jpg$").unwrap();
}

/// Classification of a page filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Single,
    /// Two facing pages stored as one image. The indices are taken from the
    /// filename verbatim; no range validation is applied, so `19-18.jpg` is
    /// still a spread.
    DoubleSpread { lo: u32, hi: u32 },
}

/// Classifies a filename as a single page or a double-page spread.
/// Pure function of the filename string alone.
pub fn classify(filename: &str) -> PageKind {
    match DOUBLE_PAGE.captures(filename) {
        Some(caps) => PageKind::DoubleSpread {
            lo: caps[1].parse().unwrap(),
            hi: caps[2].parse().unwrap(),
        },
        None => PageKind::Single,
    }
}

/// Produces the output name for `filename` at the given counter value and
/// returns the advanced counter. A single page consumes one number, a
/// double-page spread consumes two (lo and lo+1).
pub fn assign(counter: u32, filename: &str) -> (String, u32) {
    let ext = filename
        .rfind('.')
        .map(|i| &filename[i..])
        .unwrap_or_default();

    match classify(filename) {
        PageKind::DoubleSpread { .. } => {
            (format!("{:02}-{:02}{}", counter, counter + 1, ext), counter + 2)
        }
        PageKind::Single => (format!("{:02}{}", counter, ext), counter + 1),
    }
}

/// Renumbers every page across all archives, in order.
///
/// `page_lists` holds one sorted page list per source archive, with the
/// archives themselves already in merge order. Returns the ordered
/// `(new name, source path)` assignments. The counter starts at 1 and only
/// ever advances, so target names cannot collide; a duplicate is still
/// checked for and reported as [`MergeError::RenumberingConflict`].
pub fn renumber_all(page_lists: &[Vec<PathBuf>]) -> Result<Vec<(String, PathBuf)>, MergeError> {
    let mut counter = 1u32;
    let mut seen = HashSet::new();
    let mut assignments = Vec::new();

    for pages in page_lists {
        for path in pages {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let (new_name, next) = assign(counter, &filename);
            if !seen.insert(new_name.clone()) {
                return Err(MergeError::RenumberingConflict(new_name));
            }
            counter = next;
            assignments.push((new_name, path.clone()));
        }
    }

    Ok(assignments)
}
