use ed25519_dalek::{
    Signature as DalekSignature, Signer as DalekSignerTrait, SigningKey,
    Verifier as DalekVerifierTrait, VerifyingKey,
};
use thiserror::Error;

use ccn_core::PublisherKey;

use crate::keys::derive_publisher_secret;

/// Errors returned by signing/verification helpers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Publisher key bytes are not a valid Ed25519 verifying key.
    #[error("invalid publisher key {0}")]
    InvalidPublicKey(PublisherKey),
    /// The unit carries no signature.
    #[error("content object is unsigned")]
    MissingSignature,
    /// The signed portion of the unit could not be encoded.
    #[error("cannot digest signed portion: {0}")]
    Digest(String),
}

/// Trait for message signing backends.
pub trait Signer: Send + Sync {
    /// Signs `msg` and returns a 64-byte signature.
    fn sign(&self, msg: &[u8]) -> Result<[u8; 64], SigningError>;
    /// Key identifying this signer as a publisher.
    fn publisher_key(&self) -> PublisherKey;
}

/// Trait for signature verification backends.
pub trait Verifier: Send + Sync {
    /// Verifies a signature against `(publisher, msg)`.
    fn verify(
        &self,
        publisher: &PublisherKey,
        msg: &[u8],
        sig: &[u8; 64],
    ) -> Result<bool, SigningError>;
}

/// Ed25519 signing implementation backed by `ed25519-dalek`.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from a 32-byte secret key.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    /// Creates a signer whose secret is derived from `seed`.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::from_secret(derive_publisher_secret(seed))
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, msg: &[u8]) -> Result<[u8; 64], SigningError> {
        Ok(self.signing_key.sign(msg).to_bytes())
    }

    fn publisher_key(&self) -> PublisherKey {
        PublisherKey(self.signing_key.verifying_key().to_bytes())
    }
}

/// Stateless Ed25519 verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl Verifier for Ed25519Verifier {
    fn verify(
        &self,
        publisher: &PublisherKey,
        msg: &[u8],
        sig: &[u8; 64],
    ) -> Result<bool, SigningError> {
        let verifying_key = VerifyingKey::from_bytes(&publisher.0)
            .map_err(|_| SigningError::InvalidPublicKey(*publisher))?;
        let signature = DalekSignature::from_bytes(sig);
        Ok(verifying_key.verify(msg, &signature).is_ok())
    }
}
