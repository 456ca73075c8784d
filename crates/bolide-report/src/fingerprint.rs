//! Grouping fingerprint for clustering duplicate errors.
//!
//! The fingerprint is a SHA-1 hash of the error class plus coarse
//! location and method fingerprints of the raw, pre-normalisation
//! stack. The receiving service uses it to cluster reports of the same
//! underlying defect, so it must be byte-identical for identical
//! inputs.

use sha1::{Digest, Sha1};

use crate::frames::{RawFrame, UNKNOWN_FILE};

/// Delimiter between hash-input components.
const DELIMITER: &[u8] = b"\x00";

/// Compute the grouping fingerprint for an error.
///
/// Returns `None` for an empty stack; the `groupingHash` key is
/// omitted from the event in that case. The hash input is the ordered
/// list `[error_class, frame0.file, frame0.method, frame1.file, …]`
/// with `"unknown"` standing in for missing files, NUL-joined and
/// hex-encoded lowercase after digesting.
#[must_use]
pub fn grouping_hash(error_class: &str, stack: &[RawFrame]) -> Option<String> {
    if stack.is_empty() {
        return None;
    }

    let mut hasher = Sha1::new();
    hasher.update(error_class.as_bytes());
    hasher.update(DELIMITER);
    for frame in stack {
        let file = frame.location().source().map_or(UNKNOWN_FILE, |(f, _)| f);
        hasher.update(file.as_bytes());
        hasher.update(DELIMITER);
        hasher.update(frame.qualified_name().as_bytes());
        hasher.update(DELIMITER);
    }

    Some(hex::encode(hasher.finalize()))
}
