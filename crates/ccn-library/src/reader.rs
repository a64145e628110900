//! Versioned stream retrieval.
//!
//! Resolves the latest version of an unversioned name by repeatedly asking
//! for the rightmost child while excluding every version already seen, then
//! reads segments in index order until the final block.

use thiserror::Error;
use tracing::debug;

use ccn_codec::{ChildSelector, CodecError, ContentObject, Exclude, Interest};
use ccn_core::segmentation::{is_unsegmented, segment_name, segment_root, try_segment_index};
use ccn_core::versioning::{is_version_component, is_versioned};
use ccn_core::Name;
use ccn_crypto::content::verify_content;
use ccn_crypto::{SigningError, Verifier};

use crate::config::LibraryConfig;
use crate::exchange::{Exchange, ExchangeError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    /// The stream resolved to a tombstone.
    #[error("content is gone: {name}")]
    Gone { name: Name },
    #[error("timed out waiting for {name}")]
    Timeout { name: Name },
    #[error("no version found under {name}")]
    NoVersionFound { name: Name },
    #[error("signature check failed for {name}")]
    Verification { name: Name },
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// A fully reassembled stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContent {
    /// Version-qualified stream name, without any segment component.
    pub name: Name,
    pub content: Vec<u8>,
    pub segments: usize,
}

pub struct StreamReader<'a> {
    exchange: &'a Exchange,
    verifier: &'a dyn Verifier,
    config: &'a LibraryConfig,
}

impl<'a> StreamReader<'a> {
    pub fn new(exchange: &'a Exchange, verifier: &'a dyn Verifier, config: &'a LibraryConfig) -> Self {
        Self {
            exchange,
            verifier,
            config,
        }
    }

    /// Reads the stream at `name`: that exact version if `name` is versioned,
    /// otherwise the latest version below it.
    pub fn read(&self, name: &Name) -> Result<StreamContent, ReadError> {
        let first = if is_versioned(name) {
            let base = segment_root(name);
            self.fetch(Interest::new(base.clone()), &base)?
        } else {
            self.latest_version(name)?
        };
        self.read_from(first)
    }

    /// Finds a unit from the newest version of the unversioned `root`.
    pub fn latest_version(&self, root: &Name) -> Result<ContentObject, ReadError> {
        let mut exclude = Exclude::default();
        let mut best: Option<ContentObject> = None;
        let mut timeout = self.config.fetch_timeout();
        loop {
            let interest = Interest::new(root.clone())
                .with_min_suffix_components(1)
                .with_child_selector(ChildSelector::Rightmost)
                .with_exclude(exclude.clone());
            let Some(unit) = self.exchange.get(&interest, Some(timeout))? else {
                break;
            };
            let Some(next) = unit.name.component(root.len()).cloned() else {
                break;
            };
            if is_version_component(&next) {
                debug!(root = %root, candidate = %unit.name, "newer version found");
                exclude.through = Some(next);
                best = Some(unit);
                timeout = self.config.latest_version_timeout();
            } else {
                exclude.components.insert(next);
            }
        }
        best.ok_or_else(|| ReadError::NoVersionFound { name: root.clone() })
    }

    /// Reads the stream that `first` belongs to. A GONE unit yields
    /// [`ReadError::Gone`] carrying the tombstone's own name.
    pub fn read_from(&self, first: ContentObject) -> Result<StreamContent, ReadError> {
        self.check(&first)?;
        if first.is_gone() {
            return Err(ReadError::Gone { name: first.name });
        }
        if is_unsegmented(&first.name) {
            return Ok(StreamContent {
                name: first.name,
                content: first.content,
                segments: 1,
            });
        }

        let base = segment_root(&first.name);
        let mut unit = if try_segment_index(&first.name) == Some(0) {
            first
        } else {
            let name = segment_name(&base, 0);
            let unit = self.fetch(Interest::exact(name.clone()), &name)?;
            self.check(&unit)?;
            unit
        };

        let mut content = Vec::new();
        let mut segments = 0_usize;
        let mut index = 0_u64;
        loop {
            content.extend_from_slice(&unit.content);
            segments += 1;
            if unit.is_final_block() {
                break;
            }
            index = self.config.next_segment_index(index, unit.content.len());
            let name = segment_name(&base, index);
            unit = self.fetch(Interest::exact(name.clone()), &name)?;
            self.check(&unit)?;
        }
        debug!(name = %base, segments, bytes = content.len(), "stream read");
        Ok(StreamContent {
            name: base,
            content,
            segments,
        })
    }

    fn fetch(&self, interest: Interest, name: &Name) -> Result<ContentObject, ReadError> {
        self.exchange
            .get(&interest, Some(self.config.fetch_timeout()))?
            .ok_or_else(|| ReadError::Timeout { name: name.clone() })
    }

    fn check(&self, unit: &ContentObject) -> Result<(), ReadError> {
        unit.validate()?;
        if self.config.verify_signatures && !verify_content(self.verifier, unit)? {
            return Err(ReadError::Verification {
                name: unit.name.clone(),
            });
        }
        Ok(())
    }
}
