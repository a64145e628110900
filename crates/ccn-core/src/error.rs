use thiserror::Error;

/// Shared error type for naming primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The text could not be parsed as a name URI.
    #[error("invalid name uri: {0}")]
    InvalidUri(String),
    /// A name expected to carry a version component does not.
    #[error("version missing: {0}")]
    VersionMissing(String),
    /// A version component is present but cannot be decoded.
    #[error("invalid version component")]
    InvalidVersion,
}
