use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp resolution: ticks per second.
pub const TICKS_PER_SECOND: u64 = 4096;

static LAST_MINTED: AtomicU64 = AtomicU64::new(0);

/// Wall-clock timestamp in 1/4096-second ticks since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CcnTime(u64);

impl CcnTime {
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Times before the epoch clamp to zero.
    pub fn from_system_time(at: SystemTime) -> Self {
        let since = at.duration_since(UNIX_EPOCH).unwrap_or_default();
        let ticks = since.as_secs() * TICKS_PER_SECOND
            + (u64::from(since.subsec_nanos()) * TICKS_PER_SECOND) / 1_000_000_000;
        Self(ticks)
    }

    pub fn to_system_time(self) -> SystemTime {
        let secs = self.0 / TICKS_PER_SECOND;
        let nanos = ((self.0 % TICKS_PER_SECOND) * 1_000_000_000) / TICKS_PER_SECOND;
        UNIX_EPOCH + Duration::new(secs, nanos as u32)
    }

    /// Current time, bumped so that every value handed out by this process is
    /// strictly greater than the previous one.
    pub fn mint() -> Self {
        let now = Self::now().0;
        let previous = LAST_MINTED
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(previous.saturating_add(1)))
    }
}

impl fmt::Debug for CcnTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CcnTime({self})")
    }
}

impl fmt::Display for CcnTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = ((self.0 % TICKS_PER_SECOND) * 1000) / TICKS_PER_SECOND;
        write!(f, "{}.{millis:03}", self.0 / TICKS_PER_SECOND)
    }
}
