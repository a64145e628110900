use ccn_core::hash::digest_32;

const SECRET_DOMAIN: &[u8] = b"ccn/publisher-secret/v1";

/// Derives a deterministic 32-byte Ed25519 secret from an arbitrary seed.
///
/// Lets a deployment keep a human-managed seed (or a test fixture label)
/// instead of raw key bytes.
pub fn derive_publisher_secret(seed: &[u8]) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(SECRET_DOMAIN.len() + seed.len());
    preimage.extend_from_slice(SECRET_DOMAIN);
    preimage.extend_from_slice(seed);
    digest_32(&preimage)
}
