use serde::{Deserialize, Deserializer, Serialize, Serializer};

use ccn_core::hash::digest_32;
use ccn_core::{CcnTime, Component, Digest, Name, PublisherKey};

use crate::error::CodecError;

pub const CONTENT_TYPE_DATA: u32 = 0x0C04C0;
pub const CONTENT_TYPE_ENCR: u32 = 0x10D091;
pub const CONTENT_TYPE_GONE: u32 = 0x18E344;
pub const CONTENT_TYPE_KEY: u32 = 0x28463F;
pub const CONTENT_TYPE_LINK: u32 = 0x2C834A;
pub const CONTENT_TYPE_NACK: u32 = 0x34008A;

/// Content-type tag carried in the signed info of every data unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ContentType {
    #[default]
    Data,
    Encrypted,
    /// Tombstone: nothing exists at or after this name.
    Gone,
    Key,
    Link,
    Nack,
}

impl ContentType {
    pub const fn tag(self) -> u32 {
        match self {
            Self::Data => CONTENT_TYPE_DATA,
            Self::Encrypted => CONTENT_TYPE_ENCR,
            Self::Gone => CONTENT_TYPE_GONE,
            Self::Key => CONTENT_TYPE_KEY,
            Self::Link => CONTENT_TYPE_LINK,
            Self::Nack => CONTENT_TYPE_NACK,
        }
    }
}

impl From<ContentType> for u32 {
    fn from(value: ContentType) -> Self {
        value.tag()
    }
}

impl TryFrom<u32> for ContentType {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            CONTENT_TYPE_DATA => Ok(Self::Data),
            CONTENT_TYPE_ENCR => Ok(Self::Encrypted),
            CONTENT_TYPE_GONE => Ok(Self::Gone),
            CONTENT_TYPE_KEY => Ok(Self::Key),
            CONTENT_TYPE_LINK => Ok(Self::Link),
            CONTENT_TYPE_NACK => Ok(Self::Nack),
            other => Err(CodecError::UnknownContentType(other)),
        }
    }
}

/// 64-byte signature wrapper for serde byte encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Component::deserialize(deserializer)?;
        let bytes: [u8; 64] = raw
            .as_bytes()
            .try_into()
            .map_err(|_| serde::de::Error::invalid_length(raw.len(), &"exactly 64 bytes"))?;
        Ok(Self(bytes))
    }
}

/// Publisher-supplied metadata covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInfo {
    pub publisher: PublisherKey,
    pub timestamp: CcnTime,
    pub content_type: ContentType,
    /// Seconds a cached copy stays fresh, if bounded.
    pub freshness_seconds: Option<u32>,
    /// Last component of the final segment of the stream, when known.
    pub final_block_id: Option<Component>,
}

impl SignedInfo {
    pub fn new(publisher: PublisherKey, content_type: ContentType) -> Self {
        Self {
            publisher,
            timestamp: CcnTime::now(),
            content_type,
            freshness_seconds: None,
            final_block_id: None,
        }
    }
}

/// An immutable named, signed data unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentObject {
    pub name: Name,
    pub signed_info: SignedInfo,
    pub content: Vec<u8>,
    pub signature: Option<Signature>,
}

#[derive(Serialize)]
struct SignedPortion<'a> {
    name: &'a Name,
    signed_info: &'a SignedInfo,
    content_digest: Digest,
}

impl ContentObject {
    /// Builds a unit with no signature attached yet.
    pub fn unsigned(name: Name, signed_info: SignedInfo, content: Vec<u8>) -> Self {
        Self {
            name,
            signed_info,
            content,
            signature: None,
        }
    }

    /// Validates field consistency.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.name.is_empty() {
            return Err(CodecError::InvalidObject("name must not be empty"));
        }
        if self.is_gone() && !self.content.is_empty() {
            return Err(CodecError::InvalidObject("gone content must be empty"));
        }
        Ok(())
    }

    pub fn content_type(&self) -> ContentType {
        self.signed_info.content_type
    }

    pub fn is_gone(&self) -> bool {
        self.content_type() == ContentType::Gone
    }

    /// Whether this unit is the last segment of its stream. Units without a
    /// `final_block_id` are single-unit streams.
    pub fn is_final_block(&self) -> bool {
        match &self.signed_info.final_block_id {
            None => true,
            Some(last) => self.name.last_component() == Some(last),
        }
    }
}

/// Digest over the signed portion (name, signed info, content hash).
pub fn signature_message_digest(object: &ContentObject) -> Result<Digest, CodecError> {
    object.validate()?;
    let portion = SignedPortion {
        name: &object.name,
        signed_info: &object.signed_info,
        content_digest: digest_32(&object.content),
    };
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&portion, &mut bytes)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(digest_32(&bytes))
}

/// Encodes a `ContentObject` as CBOR after validation.
pub fn encode_content_cbor(object: &ContentObject) -> Result<Vec<u8>, CodecError> {
    object.validate()?;
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(object, &mut bytes)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decodes and validates a CBOR content object.
pub fn decode_content_cbor(bytes: &[u8]) -> Result<ContentObject, CodecError> {
    let object: ContentObject =
        ciborium::de::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    object.validate()?;
    Ok(object)
}

/// Content address of the encoded unit.
pub fn content_digest(object: &ContentObject) -> Result<Digest, CodecError> {
    encode_content_cbor(object).map(|bytes| digest_32(&bytes))
}
