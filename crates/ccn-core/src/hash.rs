use crate::types::Digest;

/// Computes the BLAKE3 digest used to content-address encoded data units.
pub fn digest_32(input: &[u8]) -> Digest {
    *blake3::hash(input).as_bytes()
}
