use thiserror::Error;

/// Errors returned by content/interest codec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// CBOR serialization failure.
    #[error("encode error: {0}")]
    Encode(String),
    /// CBOR deserialization failure.
    #[error("decode error: {0}")]
    Decode(String),
    /// Content-object schema validation failure.
    #[error("invalid content object: {0}")]
    InvalidObject(&'static str),
    /// Interest schema validation failure.
    #[error("invalid interest: {0}")]
    InvalidInterest(&'static str),
    /// Content type tag outside the known set.
    #[error("unknown content type tag {0:#08x}")]
    UnknownContentType(u32),
}
