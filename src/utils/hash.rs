//! Content hashing utilities.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

/// Compute a content hash for arbitrary bytes
#[must_use]
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Hex fingerprint of a value's canonical JSON form.
///
/// Struct fields serialize in declaration order and maps are `IndexMap`s,
/// so equal values always give equal fingerprints.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> crate::error::Result<String> {
    let bytes = serde_json::to_vec(value)?;
    Ok(format!("{:016x}", content_hash(&bytes)))
}
