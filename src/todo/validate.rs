//! Structural checks on the edited todo file.
//!
//! The todo only edits dates and subjects. Lines must not be removed, added
//! or moved; these errors are the user's to fix by editing again.

use std::collections::HashSet;

use thiserror::Error;

use super::TodoEntry;
use crate::commit::CommitRecord;

/// Check that `entries` name the same commits as `originals`, in order.
pub fn validate_structure(
    entries: &[TodoEntry],
    originals: &[CommitRecord],
) -> Result<(), StructureError> {
    if entries.len() < originals.len() {
        let present: HashSet<&str> = entries.iter().map(|e| e.short_hash.as_str()).collect();
        let missing = originals
            .iter()
            .filter(|o| !present.contains(o.short_hash.as_str()))
            .map(|o| o.short_hash.clone())
            .collect();
        return Err(StructureError::Deleted { missing });
    }

    if entries.len() > originals.len() {
        return Err(StructureError::Extra {
            expected: originals.len(),
            found: entries.len(),
        });
    }

    for (i, (entry, original)) in entries.iter().zip(originals).enumerate() {
        if entry.short_hash != original.short_hash {
            return Err(StructureError::Reordered {
                line: i + 1,
                expected: original.short_hash.clone(),
                found: entry.short_hash.clone(),
            });
        }
    }

    Ok(())
}

/// The edited todo no longer matches the commits being retimed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error(
        "commit(s) deleted from todo file: {}\n\
         git-retime only modifies timestamps; do not remove lines",
        .missing.join(", ")
    )]
    Deleted { missing: Vec<String> },

    #[error("extra lines in todo file: expected {expected} commits, found {found}")]
    Extra { expected: usize, found: usize },

    #[error(
        "commit order changed at line {line}: expected {expected}, got {found}\n\
         git-retime only modifies timestamps; do not reorder lines"
    )]
    Reordered {
        line: usize,
        expected: String,
        found: String,
    },
}
