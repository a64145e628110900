//! Data-unit and interest codec.
//!
//! Defines the signed content object schema (with its content-type tags,
//! including the GONE tombstone), interest selectors and matching, and CBOR
//! encode/decode helpers.

pub mod content;
pub mod error;
pub mod interest;

pub use content::{ContentObject, ContentType, Signature, SignedInfo};
pub use error::CodecError;
pub use interest::{ChildSelector, Exclude, Interest};
