//! Network access abstractions.
//!
//! The exchange layer only depends on the [`adapter::NetworkAccess`] trait and
//! the listener queues defined here. [`memory::InMemoryForwarder`] is a
//! complete in-process substrate with a content store, pending-interest
//! table and flow-balance enforcement.

pub mod adapter;
pub mod listener;
pub mod memory;

pub use adapter::{NetworkAccess, OwnerId, TransportError};
pub use listener::{ContentListener, InterestListener, Listener, ListenerId};
pub use memory::{InMemoryForwarder, InMemoryForwarderConfig};
