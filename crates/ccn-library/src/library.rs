use std::sync::Arc;

use ccn_crypto::{Ed25519Verifier, Signer, Verifier};
use ccn_transport::NetworkAccess;

use crate::config::{ConfigError, LibraryConfig};
use crate::exchange::Exchange;
use crate::flow::{FlowController, FlowLimits};
use crate::reader::StreamReader;
use crate::segmenter::Segmenter;

struct LibraryInner {
    exchange: Arc<Exchange>,
    signer: Box<dyn Signer>,
    verifier: Box<dyn Verifier>,
    config: LibraryConfig,
}

/// Shared context handed to every network object: one exchange, the
/// publishing key and the configuration. Cheap to clone.
#[derive(Clone)]
pub struct Library {
    inner: Arc<LibraryInner>,
}

impl Library {
    /// Builds a library around an already opened exchange. The exchange
    /// adopts the configured retry policy.
    pub fn new(
        exchange: Exchange,
        signer: impl Signer + 'static,
        config: LibraryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let exchange = exchange.with_retry_policy(config.retry);
        Ok(Self {
            inner: Arc::new(LibraryInner {
                exchange: Arc::new(exchange),
                signer: Box::new(signer),
                verifier: Box::new(Ed25519Verifier),
                config,
            }),
        })
    }

    /// Opens a fresh exchange on `network`.
    pub fn open(
        network: Arc<dyn NetworkAccess>,
        signer: impl Signer + 'static,
        config: LibraryConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(Exchange::new(network), signer, config)
    }

    pub fn exchange(&self) -> &Arc<Exchange> {
        &self.inner.exchange
    }

    pub fn signer(&self) -> &dyn Signer {
        self.inner.signer.as_ref()
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.inner.config
    }

    pub fn reader(&self) -> StreamReader<'_> {
        StreamReader::new(
            &self.inner.exchange,
            self.inner.verifier.as_ref(),
            &self.inner.config,
        )
    }

    pub fn segmenter(&self) -> Segmenter<'_> {
        Segmenter::new(self.inner.signer.as_ref(), &self.inner.config)
    }

    /// A new flow controller publishing through this library's exchange.
    pub fn flow_controller(&self) -> FlowController {
        FlowController::new(
            Arc::clone(&self.inner.exchange),
            FlowLimits {
                buffer_capacity: self.inner.config.flow_buffer_capacity,
                max_unsatisfied_interests: self.inner.config.max_unsatisfied_interests,
            },
        )
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("exchange", &self.inner.exchange)
            .field("publisher", &self.inner.signer.publisher_key())
            .finish()
    }
}
