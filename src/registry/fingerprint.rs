//! Content-addressed column-set fingerprints.
//!
//! A cache table is identified by the set of raw columns it stores, not
//! by the request that created it. Fingerprints are computed over the
//! sorted, deduplicated column names with the intrinsic time-partition
//! columns removed, so request order and the presence of time columns
//! never change the identity.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Columns every cache table carries intrinsically; excluded from
/// fingerprints and from per-column schema derivation.
pub const TIME_PARTITION_COLUMNS: [&str; 2] = ["date", "hour"];

/// True when a column is one of the intrinsic time-partition columns.
pub fn is_time_partition(name: &str) -> bool {
    TIME_PARTITION_COLUMNS.contains(&name)
}

/// Compute the fingerprint of a cache-column set.
///
/// Returns a base64-encoded SHA-256 digest. Deterministic across request
/// order; distinct sets collide only with cryptographic improbability.
pub fn fingerprint<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = columns
        .into_iter()
        .filter(|name| !is_time_partition(name))
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut hasher = Sha256::new();
    for name in &names {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    STANDARD.encode(hasher.finalize())
}
