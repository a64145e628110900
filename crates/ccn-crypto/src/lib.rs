//! Signing collaborator for published data units.
//!
//! Includes Ed25519 signer/verifier abstractions, publisher secret
//! derivation, and helpers that sign or check a `ContentObject`.

pub mod content;
pub mod keys;
pub mod signing;

pub use signing::{Ed25519Signer, Ed25519Verifier, Signer, SigningError, Verifier};
