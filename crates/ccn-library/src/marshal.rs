use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Converts an application value to and from the bytes of a stream.
pub trait PayloadCodec<E> {
    fn encode(value: &E) -> Result<Vec<u8>, MarshalError>;
    fn decode(bytes: &[u8]) -> Result<E, MarshalError>;
}

/// Default payload codec: serde values as CBOR.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl<E> PayloadCodec<E> for CborCodec
where
    E: Serialize + DeserializeOwned,
{
    fn encode(value: &E) -> Result<Vec<u8>, MarshalError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|e| MarshalError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<E, MarshalError> {
        ciborium::de::from_reader(bytes).map_err(|e| MarshalError::Decode(e.to_string()))
    }
}
