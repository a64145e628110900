//! Signing and verification of whole data units.

use ccn_codec::content::signature_message_digest;
use ccn_codec::{ContentObject, Signature};

use crate::signing::{Signer, SigningError, Verifier};

/// Stamps the signer's publisher key into `object` and attaches a signature
/// over its signed portion.
pub fn sign_content(signer: &dyn Signer, object: &mut ContentObject) -> Result<(), SigningError> {
    object.signed_info.publisher = signer.publisher_key();
    let digest =
        signature_message_digest(object).map_err(|e| SigningError::Digest(e.to_string()))?;
    object.signature = Some(Signature(signer.sign(&digest)?));
    Ok(())
}

/// Checks the unit's signature against its declared publisher.
pub fn verify_content(
    verifier: &dyn Verifier,
    object: &ContentObject,
) -> Result<bool, SigningError> {
    let signature = object
        .signature
        .as_ref()
        .ok_or(SigningError::MissingSignature)?;
    let digest =
        signature_message_digest(object).map_err(|e| SigningError::Digest(e.to_string()))?;
    verifier.verify(&object.signed_info.publisher, &digest, &signature.0)
}
