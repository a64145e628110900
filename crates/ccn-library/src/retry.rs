use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ccn_transport::TransportError;

use crate::exchange::ExchangeError;

/// How often an interrupted exchange call is re-issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const UNBOUNDED: Self = Self { max_attempts: None };

    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether attempt number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

/// Shared flag that stops retry loops at their next attempt boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs `op` until it stops reporting [`TransportError::Interrupted`], the
/// policy runs out of attempts, or `token` is cancelled.
pub(crate) fn run_with_retry<T>(
    policy: RetryPolicy,
    token: &CancellationToken,
    op: &'static str,
    mut attempt_op: impl FnMut() -> Result<T, TransportError>,
) -> Result<T, ExchangeError> {
    let mut attempt = 1_u32;
    loop {
        if token.is_cancelled() {
            return Err(ExchangeError::Cancelled);
        }
        match attempt_op() {
            Ok(value) => return Ok(value),
            Err(TransportError::Interrupted) => {
                if !policy.allows(attempt + 1) {
                    return Err(ExchangeError::RetriesExhausted { op, attempts: attempt });
                }
                debug!(op, attempt, "interrupted, retrying");
                attempt += 1;
            }
            Err(err) => return Err(ExchangeError::Transport(err)),
        }
    }
}
