//! Mutable, versioned objects on a content-centric substrate.
//!
//! This crate layers the low-level exchange, flow-balanced publication,
//! stream segmentation and reassembly, and the network object state machine
//! on top of a pluggable [`ccn_transport::NetworkAccess`] handle.

pub mod config;
pub mod exchange;
pub mod flow;
pub mod library;
pub mod marshal;
pub mod network_object;
pub mod reader;
pub mod retry;
pub mod segmenter;
pub mod tracked;

pub use config::{ConfigError, LibraryConfig};
pub use exchange::{Exchange, ExchangeError, NO_TIMEOUT};
pub use flow::{FlowController, FlowError, FlowLimits};
pub use library::Library;
pub use marshal::{CborCodec, MarshalError, PayloadCodec};
pub use network_object::{NetworkObject, ObjectError, ObjectState};
pub use reader::{ReadError, StreamContent, StreamReader};
pub use retry::{CancellationToken, RetryPolicy};
pub use segmenter::Segmenter;
pub use tracked::TrackedValue;
