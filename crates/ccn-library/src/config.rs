use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ccn_core::segmentation::{SegmentNumbering, DEFAULT_BLOCK_SIZE, DEFAULT_INCREMENT};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Tunables shared by the writer, reader and flow controller of one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Payload bytes per segment.
    pub block_size: usize,
    /// Index step between consecutive segments (fixed-increment numbering).
    pub segment_increment: u64,
    pub numbering: SegmentNumbering,
    /// Per-unit `get` timeout while reading a stream.
    pub fetch_timeout_ms: u64,
    /// How long version discovery waits for something newer than the best
    /// version seen so far.
    pub latest_version_timeout_ms: u64,
    pub verify_signatures: bool,
    /// Freshness stamped on every published unit.
    pub freshness_seconds: Option<u32>,
    /// Incoming interests remembered while no buffered unit answers them.
    pub max_unsatisfied_interests: usize,
    /// Published units the flow controller keeps available for re-serving.
    pub flow_buffer_capacity: usize,
    /// Retry policy for interrupted exchange calls.
    pub retry: RetryPolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            segment_increment: DEFAULT_INCREMENT,
            numbering: SegmentNumbering::FixedIncrement,
            fetch_timeout_ms: 4_000,
            latest_version_timeout_ms: 500,
            verify_signatures: true,
            freshness_seconds: None,
            max_unsatisfied_interests: 1_024,
            flow_buffer_capacity: 4_096,
            retry: RetryPolicy::default(),
        }
    }
}

impl LibraryConfig {
    /// Parses a TOML fragment; absent keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be positive"));
        }
        if self.segment_increment == 0 {
            return Err(ConfigError::Invalid("segment_increment must be positive"));
        }
        if self.flow_buffer_capacity == 0 {
            return Err(ConfigError::Invalid("flow_buffer_capacity must be positive"));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn latest_version_timeout(&self) -> Duration {
        Duration::from_millis(self.latest_version_timeout_ms)
    }

    /// Index of the segment following `index` whose payload was `len` bytes.
    pub fn next_segment_index(&self, index: u64, len: usize) -> u64 {
        match self.numbering {
            SegmentNumbering::FixedIncrement => index + self.segment_increment,
            SegmentNumbering::ByteCount => index + len as u64,
        }
    }
}
