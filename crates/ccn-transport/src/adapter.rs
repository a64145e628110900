use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;

use ccn_codec::{CodecError, ContentObject, Interest};
use ccn_core::Name;

use crate::listener::{ContentListener, InterestListener, ListenerId};

/// Failures surfaced by a network access handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Transient interruption of a blocking call; safe to retry.
    #[error("operation interrupted")]
    Interrupted,
    /// The handle has been shut down.
    #[error("network access closed")]
    Closed,
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("i/o error: {0}")]
    Io(String),
}

impl TransportError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Identity of one exchange-layer handle; part of every registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocates a process-unique owner id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Connection to the forwarder.
///
/// Implementations must be safe to share between threads; registrations are
/// keyed by `(owner, prefix-or-interest, listener)`.
pub trait NetworkAccess: Send + Sync {
    /// Hands one signed unit to the substrate. Units that answer no pending
    /// interest are dropped without error.
    fn put(&self, object: &ContentObject) -> Result<(), TransportError>;

    /// Blocks until a matching unit arrives. `None` waits indefinitely;
    /// `Ok(None)` means the deadline passed without a match.
    fn get(
        &self,
        interest: &Interest,
        timeout: Option<Duration>,
    ) -> Result<Option<ContentObject>, TransportError>;

    /// Routes future incoming interests under `prefix` to `listener`.
    fn set_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: &InterestListener,
    ) -> Result<(), TransportError>;

    fn cancel_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: ListenerId,
    ) -> Result<(), TransportError>;

    /// Registers a standing interest; every matching unit is pushed to
    /// `listener` until cancelled.
    fn express_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: &ContentListener,
    ) -> Result<(), TransportError>;

    fn cancel_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: ListenerId,
    ) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::{OwnerId, TransportError};
    use ccn_codec::CodecError;

    #[test]
    fn owner_ids_are_unique() {
        let a = OwnerId::next();
        let b = OwnerId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn only_interruption_is_transient() {
        assert!(TransportError::Interrupted.is_interrupted());
        assert!(!TransportError::Closed.is_interrupted());
        let codec: TransportError = CodecError::InvalidObject("x").into();
        assert!(!codec.is_interrupted());
        assert_eq!(codec.to_string(), "codec error: invalid content object: x");
    }
}
