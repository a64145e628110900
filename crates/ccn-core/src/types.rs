use std::fmt;

use serde::{Deserialize, Serialize};

/// 32-byte content digest of an encoded data unit.
pub type Digest = [u8; 32];

/// Raw 32-byte public key identifying the publisher of a data unit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PublisherKey(pub [u8; 32]);

impl PublisherKey {
    /// Hex rendering of the key bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublisherKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
