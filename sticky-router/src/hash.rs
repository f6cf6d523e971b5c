//! Deterministic client-address-to-backend-index hashing.

use sha1::{Digest, Sha1};

/// Hashes `client_addr` (the textual form of an IP address) down to a
/// backend index in `0..backend_count`. The same address always maps to the
/// same index for a given `backend_count`, independent of process restarts
/// or call order — the SHA-1 digest is a pure function of its input, unlike
/// a hasher seeded per-process.
pub fn sticky_index(client_addr: &str, backend_count: usize) -> usize {
    assert!(backend_count > 0, "backend_count must be non-zero");
    let digest = Sha1::digest(client_addr.as_bytes());
    // Fold the 20-byte digest into a u128 the same way the reference
    // implementation folds its full-width hex digest, then reduce mod N.
    let mut acc: u128 = 0;
    for byte in digest.iter().take(16) {
        acc = (acc << 8) | (*byte as u128);
    }
    (acc % backend_count as u128) as usize
}
