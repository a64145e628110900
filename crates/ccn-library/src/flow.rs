//! Flow-balanced publication.
//!
//! A [`FlowController`] only emits units in answer to interests. Publishers
//! declare namespaces, which become interest filters on the exchange; units
//! put under those namespaces are buffered and a responder thread answers
//! each forwarded interest from the buffer. Interests that nothing buffered
//! can answer are remembered, and a later `put` answers them directly.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use ccn_codec::{CodecError, ContentObject, Interest};
use ccn_core::Name;
use ccn_crypto::SigningError;
use ccn_transport::InterestListener;

use crate::exchange::{Exchange, ExchangeError};

const RESPONDER_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("{name} is outside every registered namespace")]
    OutsideNamespace { name: Name },
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Buffer sizing for a [`FlowController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLimits {
    pub buffer_capacity: usize,
    pub max_unsatisfied_interests: usize,
}

impl Default for FlowLimits {
    fn default() -> Self {
        Self {
            buffer_capacity: 4_096,
            max_unsatisfied_interests: 1_024,
        }
    }
}

#[derive(Default)]
struct FlowState {
    namespaces: BTreeSet<Name>,
    buffer: BTreeMap<Name, ContentObject>,
    arrival_order: VecDeque<Name>,
    unsatisfied: VecDeque<Interest>,
}

struct FlowShared {
    exchange: Arc<Exchange>,
    limits: FlowLimits,
    state: Mutex<FlowState>,
}

impl FlowShared {
    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, interest: Interest) {
        let hit = {
            let mut state = self.lock();
            match interest.select(state.buffer.values()).cloned() {
                Some(hit) => hit,
                None => {
                    if state.unsatisfied.len() >= self.limits.max_unsatisfied_interests {
                        state.unsatisfied.pop_front();
                    }
                    debug!(name = %interest.name, "interest held until content is put");
                    state.unsatisfied.push_back(interest);
                    return;
                }
            }
        };
        debug!(interest = %interest.name, name = %hit.name, "answering interest from buffer");
        if let Err(err) = self.exchange.put(hit) {
            warn!(error = %err, "failed to answer interest");
        }
    }
}

pub struct FlowController {
    shared: Arc<FlowShared>,
    listener: InterestListener,
    running: Arc<AtomicBool>,
    responder: Option<JoinHandle<()>>,
}

impl FlowController {
    /// Starts a controller and its responder thread.
    pub fn new(exchange: Arc<Exchange>, limits: FlowLimits) -> Self {
        let shared = Arc::new(FlowShared {
            exchange,
            limits,
            state: Mutex::new(FlowState::default()),
        });
        let listener = InterestListener::new();
        let running = Arc::new(AtomicBool::new(true));

        let responder = {
            let shared = Arc::clone(&shared);
            let listener = listener.clone();
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::Acquire) {
                    if let Some(interest) = listener.next_timeout(RESPONDER_POLL) {
                        shared.answer(interest);
                    }
                }
            })
        };

        Self {
            shared,
            listener,
            running,
            responder: Some(responder),
        }
    }

    /// Declares that this controller may publish under `prefix`.
    pub fn add_namespace(&self, prefix: &Name) -> Result<(), FlowError> {
        if !self.shared.lock().namespaces.insert(prefix.clone()) {
            return Ok(());
        }
        if let Err(err) = self.shared.exchange.register_filter(prefix, &self.listener) {
            self.shared.lock().namespaces.remove(prefix);
            return Err(err.into());
        }
        debug!(prefix = %prefix, "namespace registered");
        Ok(())
    }

    pub fn remove_namespace(&self, prefix: &Name) -> Result<(), FlowError> {
        if self.shared.lock().namespaces.remove(prefix) {
            self.shared
                .exchange
                .unregister_filter(prefix, &self.listener)?;
        }
        Ok(())
    }

    pub fn namespaces(&self) -> Vec<Name> {
        self.shared.lock().namespaces.iter().cloned().collect()
    }

    /// Buffers `object` and answers the oldest remembered interest it
    /// satisfies, if any.
    pub fn put(&self, object: ContentObject) -> Result<(), FlowError> {
        object.validate()?;
        let waiting = {
            let mut state = self.shared.lock();
            if !state.namespaces.iter().any(|ns| ns.is_prefix_of(&object.name)) {
                return Err(FlowError::OutsideNamespace { name: object.name });
            }
            if state.buffer.insert(object.name.clone(), object.clone()).is_none() {
                state.arrival_order.push_back(object.name.clone());
            }
            while state.arrival_order.len() > self.shared.limits.buffer_capacity {
                if let Some(evicted) = state.arrival_order.pop_front() {
                    state.buffer.remove(&evicted);
                }
            }
            let position = state.unsatisfied.iter().position(|i| i.matches(&object));
            position.and_then(|idx| state.unsatisfied.remove(idx))
        };

        match waiting {
            Some(interest) => {
                debug!(interest = %interest.name, name = %object.name, "answering held interest");
                self.shared.exchange.put(object)?;
            }
            None => debug!(name = %object.name, "content buffered"),
        }
        Ok(())
    }

    pub fn put_all(&self, objects: impl IntoIterator<Item = ContentObject>) -> Result<(), FlowError> {
        for object in objects {
            self.put(object)?;
        }
        Ok(())
    }

    pub fn buffered_len(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    pub fn unsatisfied_len(&self) -> usize {
        self.shared.lock().unsatisfied.len()
    }

    pub fn exchange(&self) -> &Arc<Exchange> {
        &self.shared.exchange
    }
}

impl Drop for FlowController {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        let namespaces: Vec<Name> = self.shared.lock().namespaces.iter().cloned().collect();
        for prefix in namespaces {
            let _ = self.shared.exchange.unregister_filter(&prefix, &self.listener);
        }
        if let Some(responder) = self.responder.take() {
            let _ = responder.join();
        }
    }
}

impl std::fmt::Debug for FlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowController")
            .field("namespaces", &self.namespaces())
            .field("buffered", &self.buffered_len())
            .finish()
    }
}
