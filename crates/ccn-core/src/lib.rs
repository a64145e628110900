//! Core naming primitives shared across crates.
//!
//! Includes the binary name codec, the segmentation and versioning profiles,
//! timestamps, digest helpers, and base errors.

pub mod error;
pub mod hash;
pub mod name;
pub mod segmentation;
pub mod time;
pub mod types;
pub mod versioning;

pub use error::CoreError;
pub use name::{Component, Name};
pub use time::CcnTime;
pub use types::{Digest, PublisherKey};
