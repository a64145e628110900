//! In-process forwarder.
//!
//! Holds a bounded content store, a pending-interest table of one-shot
//! waiters and standing interests, and the interest filters registered by
//! publishers. A unit is admitted only when it answers something pending.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

use ccn_codec::content::content_digest;
use ccn_codec::{ContentObject, Interest};
use ccn_core::{Digest, Name};

use crate::adapter::{NetworkAccess, OwnerId, TransportError};
use crate::listener::{ContentListener, InterestListener, ListenerId};

/// Sizing knobs for [`InMemoryForwarder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InMemoryForwarderConfig {
    pub content_store_capacity: usize,
}

impl Default for InMemoryForwarderConfig {
    fn default() -> Self {
        Self {
            content_store_capacity: 65_536,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ContentKey {
    name: Name,
    digest: Digest,
}

struct PendingGet {
    id: u64,
    interest: Interest,
    answer: Option<ContentObject>,
}

struct StandingInterest {
    owner: OwnerId,
    interest: Interest,
    listener: ContentListener,
}

struct Filter {
    owner: OwnerId,
    prefix: Name,
    listener: InterestListener,
}

struct State {
    store: LruCache<ContentKey, ContentObject>,
    pending: Vec<PendingGet>,
    standing: Vec<StandingInterest>,
    filters: Vec<Filter>,
    next_pending_id: u64,
}

impl State {
    fn lookup(&mut self, interest: &Interest) -> Option<ContentObject> {
        let hit = interest.select(self.store.iter().map(|(_, object)| object))?;
        let key = ContentKey {
            name: hit.name.clone(),
            digest: content_digest(hit).ok()?,
        };
        self.store.get(&key).cloned()
    }

    fn dispatch_to_filters(&self, interest: &Interest) -> usize {
        let mut delivered = 0;
        for filter in &self.filters {
            if filter.prefix.is_prefix_of(&interest.name) {
                filter.listener.deliver(interest.clone());
                delivered += 1;
            }
        }
        delivered
    }

    fn take_answer(&mut self, id: u64) -> Option<ContentObject> {
        let idx = self.pending.iter().position(|p| p.id == id)?;
        if self.pending[idx].answer.is_some() {
            return self.pending.swap_remove(idx).answer;
        }
        None
    }

    fn forget(&mut self, id: u64) {
        self.pending.retain(|p| p.id != id);
    }
}

/// Shared in-memory forwarder implementing [`NetworkAccess`].
///
/// Usually wrapped in an `Arc` and handed to several exchanges, each of which
/// plays the role of one application face.
pub struct InMemoryForwarder {
    state: Mutex<State>,
    arrivals: Condvar,
    closed: AtomicBool,
}

impl InMemoryForwarder {
    pub fn new(config: InMemoryForwarderConfig) -> Self {
        let capacity = NonZeroUsize::new(config.content_store_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(State {
                store: LruCache::new(capacity),
                pending: Vec::new(),
                standing: Vec::new(),
                filters: Vec::new(),
                next_pending_id: 0,
            }),
            arrivals: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Shuts the forwarder down and wakes every blocked `get`.
    pub fn close(&self) {
        let state = self.lock();
        self.closed.store(true, Ordering::Release);
        drop(state);
        self.arrivals.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of cached units.
    pub fn cached_len(&self) -> usize {
        self.lock().store.len()
    }

    /// Number of one-shot interests still waiting for data.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

impl Default for InMemoryForwarder {
    fn default() -> Self {
        Self::new(InMemoryForwarderConfig::default())
    }
}

impl NetworkAccess for InMemoryForwarder {
    fn put(&self, object: &ContentObject) -> Result<(), TransportError> {
        self.ensure_open()?;
        let digest = content_digest(object)?;
        let mut state = self.lock();

        let mut answered = 0_usize;
        for pending in state.pending.iter_mut() {
            if pending.answer.is_none() && pending.interest.matches(object) {
                pending.answer = Some(object.clone());
                answered += 1;
            }
        }
        for standing in &state.standing {
            if standing.interest.matches(object) {
                standing.listener.deliver(object.clone());
                answered += 1;
            }
        }
        if answered == 0 {
            debug!(name = %object.name, "dropping content with no pending interest");
            return Ok(());
        }

        state.store.put(
            ContentKey {
                name: object.name.clone(),
                digest,
            },
            object.clone(),
        );
        drop(state);
        self.arrivals.notify_all();
        Ok(())
    }

    fn get(
        &self,
        interest: &Interest,
        timeout: Option<Duration>,
    ) -> Result<Option<ContentObject>, TransportError> {
        self.ensure_open()?;
        interest.validate()?;
        let mut state = self.lock();
        if let Some(hit) = state.lookup(interest) {
            return Ok(Some(hit));
        }
        if timeout == Some(Duration::ZERO) {
            return Ok(None);
        }

        let id = state.next_pending_id;
        state.next_pending_id += 1;
        state.pending.push(PendingGet {
            id,
            interest: interest.clone(),
            answer: None,
        });
        let forwarded = state.dispatch_to_filters(interest);
        debug!(name = %interest.name, forwarded, "interest pending");

        // Unrepresentable deadlines wait without bound.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            if let Some(answer) = state.take_answer(id) {
                return Ok(Some(answer));
            }
            if self.is_closed() {
                state.forget(id);
                return Err(TransportError::Closed);
            }
            state = match deadline {
                None => self
                    .arrivals
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.forget(id);
                        return Ok(None);
                    }
                    self.arrivals
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    fn set_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: &InterestListener,
    ) -> Result<(), TransportError> {
        self.ensure_open()?;
        let mut state = self.lock();
        let exists = state.filters.iter().any(|f| {
            f.owner == owner && &f.prefix == prefix && f.listener.id() == listener.id()
        });
        if !exists {
            state.filters.push(Filter {
                owner,
                prefix: prefix.clone(),
                listener: listener.clone(),
            });
        }
        Ok(())
    }

    fn cancel_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: ListenerId,
    ) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.lock()
            .filters
            .retain(|f| !(f.owner == owner && &f.prefix == prefix && f.listener.id() == listener));
        Ok(())
    }

    fn express_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: &ContentListener,
    ) -> Result<(), TransportError> {
        self.ensure_open()?;
        interest.validate()?;
        let mut state = self.lock();
        let exists = state.standing.iter().any(|s| {
            s.owner == owner && &s.interest == interest && s.listener.id() == listener.id()
        });
        if exists {
            return Ok(());
        }
        state.standing.push(StandingInterest {
            owner,
            interest: interest.clone(),
            listener: listener.clone(),
        });
        if let Some(hit) = state.lookup(interest) {
            listener.deliver(hit);
        }
        state.dispatch_to_filters(interest);
        Ok(())
    }

    fn cancel_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: ListenerId,
    ) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.lock().standing.retain(|s| {
            !(s.owner == owner && &s.interest == interest && s.listener.id() == listener)
        });
        Ok(())
    }
}
