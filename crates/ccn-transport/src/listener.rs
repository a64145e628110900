//! Channel-backed delivery queues for standing registrations.
//!
//! A listener is identified by its [`ListenerId`]; clones share the same
//! queue and id, so the forwarder can hold a clone while the caller drains it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::time::Duration;

use ccn_codec::{ContentObject, Interest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receives interests forwarded to a registered filter.
pub type InterestListener = Listener<Interest>;
/// Receives units matching a standing interest.
pub type ContentListener = Listener<ContentObject>;

pub struct Listener<T> {
    id: ListenerId,
    tx: mpsc::Sender<T>,
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Listener<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            id: ListenerId::next(),
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Pushes one item onto the queue.
    pub fn deliver(&self, item: T) {
        // The receiver lives as long as any clone, including this one.
        let _ = self.tx.send(item);
    }

    pub fn try_next(&self) -> Option<T> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next item.
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.recv_timeout(timeout).ok()
    }

    /// Takes everything queued so far without blocking.
    pub fn drain(&self) -> Vec<T> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.try_iter().collect()
    }
}

impl<T> Default for Listener<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}
