//! Low-level put/get exchange over a [`NetworkAccess`] handle.
//!
//! An [`Exchange`] is the explicit context every higher layer is handed. It
//! owns one network handle plus the owner id that scopes its filter and
//! standing-interest registrations, and wraps every call in the retry policy
//! for transient interruptions. Timeouts and flow-balance drops are never
//! retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use ccn_codec::{ContentObject, Interest};
use ccn_core::Name;
use ccn_transport::{ContentListener, InterestListener, NetworkAccess, OwnerId, TransportError};

use crate::retry::{run_with_retry, CancellationToken, RetryPolicy};

/// Passed as the `get` timeout to wait indefinitely.
pub const NO_TIMEOUT: Option<Duration> = None;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("exchange cancelled")]
    Cancelled,
    #[error("{op} still interrupted after {attempts} attempts")]
    RetriesExhausted { op: &'static str, attempts: u32 },
}

pub struct Exchange {
    owner: OwnerId,
    network: Arc<dyn NetworkAccess>,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl Exchange {
    pub fn new(network: Arc<dyn NetworkAccess>) -> Self {
        Self {
            owner: OwnerId::next(),
            network,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Obtains the network handle from `factory` once, failing if it cannot
    /// be created.
    pub fn open<F>(factory: F) -> Result<Self, ExchangeError>
    where
        F: FnOnce() -> Result<Arc<dyn NetworkAccess>, TransportError>,
    {
        let network = factory()?;
        let exchange = Self::new(network);
        debug!(owner = exchange.owner.get(), "exchange opened");
        Ok(exchange)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn network(&self) -> &Arc<dyn NetworkAccess> {
        &self.network
    }

    /// Publishes one signed unit and returns it. Only meaningful in answer to
    /// a pending interest; unsolicited units are dropped by the substrate.
    pub fn put(&self, object: ContentObject) -> Result<ContentObject, ExchangeError> {
        run_with_retry(self.retry, &self.cancel, "put", || self.network.put(&object))?;
        Ok(object)
    }

    /// Blocking fetch. `Ok(None)` when the deadline passes without a match.
    /// Retries after an interruption only wait for what is left of the
    /// original deadline. A timeout too large to form a deadline waits
    /// without bound.
    pub fn get(
        &self,
        interest: &Interest,
        timeout: Option<Duration>,
    ) -> Result<Option<ContentObject>, ExchangeError> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        run_with_retry(self.retry, &self.cancel, "get", || {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            self.network.get(interest, remaining)
        })
    }

    pub fn register_filter(
        &self,
        prefix: &Name,
        listener: &InterestListener,
    ) -> Result<(), ExchangeError> {
        run_with_retry(self.retry, &self.cancel, "register_filter", || {
            self.network.set_interest_filter(self.owner, prefix, listener)
        })
    }

    pub fn unregister_filter(
        &self,
        prefix: &Name,
        listener: &InterestListener,
    ) -> Result<(), ExchangeError> {
        run_with_retry(self.retry, &self.cancel, "unregister_filter", || {
            self.network
                .cancel_interest_filter(self.owner, prefix, listener.id())
        })
    }

    /// Issues a standing interest; matches arrive on `listener` until
    /// [`Exchange::cancel_interest`].
    pub fn express_interest(
        &self,
        interest: &Interest,
        listener: &ContentListener,
    ) -> Result<(), ExchangeError> {
        run_with_retry(self.retry, &self.cancel, "express_interest", || {
            self.network.express_interest(self.owner, interest, listener)
        })
    }

    pub fn cancel_interest(
        &self,
        interest: &Interest,
        listener: &ContentListener,
    ) -> Result<(), ExchangeError> {
        run_with_retry(self.retry, &self.cancel, "cancel_interest", || {
            self.network
                .cancel_interest(self.owner, interest, listener.id())
        })
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("owner", &self.owner)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::{Exchange, ExchangeError};
    use ccn_codec::{ContentObject, ContentType, Interest, SignedInfo};
    use ccn_core::{Name, PublisherKey};
    use ccn_transport::{InMemoryForwarder, NetworkAccess, TransportError};

    #[test]
    fn open_propagates_factory_failure() {
        let err = Exchange::open(|| Err(TransportError::Io("refused".into())))
            .expect_err("factory failure should surface");
        assert_eq!(
            err,
            ExchangeError::Transport(TransportError::Io("refused".into()))
        );
    }

    #[test]
    fn each_exchange_has_its_own_owner() {
        let network: Arc<dyn NetworkAccess> = Arc::new(InMemoryForwarder::default());
        let a = Exchange::new(Arc::clone(&network));
        let b = Exchange::new(network);
        assert_ne!(a.owner(), b.owner());
    }

    #[test]
    fn zero_timeout_returns_absent_immediately() {
        let network: Arc<dyn NetworkAccess> = Arc::new(InMemoryForwarder::default());
        let exchange = Exchange::open(|| Ok(network)).expect("open should succeed");
        let interest = Interest::new(Name::from_uri("/nothing").expect("uri should parse"));
        let got = exchange
            .get(&interest, Some(Duration::ZERO))
            .expect("get should run");
        assert!(got.is_none());
    }

    #[test]
    fn oversized_timeout_is_an_unbounded_wait() {
        let forwarder = Arc::new(InMemoryForwarder::default());
        let network: Arc<dyn NetworkAccess> = forwarder.clone();
        let exchange = Exchange::new(network);
        let reader = thread::spawn(move || {
            let interest = Interest::new(Name::from_uri("/far").expect("uri should parse"));
            exchange.get(&interest, Some(Duration::MAX))
        });
        while forwarder.pending_len() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        let unit = ContentObject::unsigned(
            Name::from_uri("/far/1").expect("uri should parse"),
            SignedInfo::new(PublisherKey::default(), ContentType::Data),
            b"far".to_vec(),
        );
        forwarder.put(&unit).expect("put should succeed");
        let got = reader
            .join()
            .expect("reader thread should not panic")
            .expect("get should succeed")
            .expect("get should be answered");
        assert_eq!(got.name, unit.name);
    }

    #[test]
    fn cancelled_exchange_refuses_work() {
        let exchange = Exchange::new(Arc::new(InMemoryForwarder::default()));
        exchange.cancellation_token().cancel();
        let interest = Interest::new(Name::from_uri("/x").expect("uri should parse"));
        assert_eq!(
            exchange.get(&interest, Some(Duration::ZERO)),
            Err(ExchangeError::Cancelled)
        );
    }
}
