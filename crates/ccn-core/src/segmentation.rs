//! Segment numbering carried in the last name component.
//!
//! For consecutive numbering the component is `0xF8` followed by the index as
//! a minimal-length big-endian unsigned integer, so index 0 is the single byte
//! `%F8` and index 1 is `%F8%01`. Components starting `%F8%00` are never
//! produced; the legacy two-byte `%F8%00` "explicitly unsegmented" marker is
//! still recognized as unsegmented when decoding.

use serde::{Deserialize, Serialize};

use crate::name::{Component, Name};

/// Leading byte of a consecutive segment component.
pub const SEGMENT_MARKER: u8 = 0xF8;
/// Leading byte reserved for non-consecutive (e.g. byte offset) numbering.
pub const NON_CONSECUTIVE_SEGMENT_MARKER: u8 = 0xFB;
/// Second byte of the legacy "no segment" marker.
pub const NO_SEGMENT_POSTFIX: u8 = 0x00;
/// Encoding of segment 0.
pub const FIRST_SEGMENT_MARKER: [u8; 1] = [SEGMENT_MARKER];
/// Legacy marker for explicitly unsegmented content.
pub const NO_SEGMENT_MARKER: [u8; 2] = [SEGMENT_MARKER, NO_SEGMENT_POSTFIX];

pub const BASE_SEGMENT: u64 = 0;
pub const DEFAULT_BLOCK_SIZE: usize = 4096;
pub const DEFAULT_INCREMENT: u64 = 1;
pub const DEFAULT_SCALE: u64 = 1;

/// Returned by [`segment_index`] for names that carry no segment marker.
pub const SEGMENT_INDEX_NONE: i64 = -1;

/// What successive segment indices count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentNumbering {
    /// Index advances by a fixed increment per segment.
    #[default]
    FixedIncrement,
    /// Index is the byte offset of the segment within the stream.
    ByteCount,
}

pub fn is_unsegmented(name: &Name) -> bool {
    match name.last_component().map(Component::as_bytes) {
        None => true,
        Some(bytes) => {
            bytes.is_empty()
                || bytes[0] != SEGMENT_MARKER
                || (bytes.len() > 1 && bytes[1] == NO_SEGMENT_POSTFIX)
        }
    }
}

pub fn is_segment(name: &Name) -> bool {
    !is_unsegmented(name)
}

/// Drops the segment component, if any.
pub fn segment_root(name: &Name) -> Name {
    if is_unsegmented(name) {
        name.clone()
    } else {
        name.cut_last()
    }
}

/// Builds the component for segment `index`.
pub fn segment_component(index: u64) -> Component {
    if index == BASE_SEGMENT {
        return Component::from_slice(&FIRST_SEGMENT_MARKER);
    }
    let be = index.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    let mut out = Vec::with_capacity(1 + be.len() - skip);
    out.push(SEGMENT_MARKER);
    out.extend_from_slice(&be[skip..]);
    Component::from(out)
}

/// Names segment `index` of the stream rooted at `name` (re-rooting if `name`
/// is itself a segment name).
pub fn segment_name(name: &Name, index: u64) -> Name {
    segment_root(name).child(segment_component(index))
}

/// Strict decode of the segment index; `None` for unsegmented names or indices
/// wider than 64 bits.
pub fn try_segment_index(name: &Name) -> Option<u64> {
    if is_unsegmented(name) {
        return None;
    }
    let digits = &name.last_component()?.as_bytes()[1..];
    if digits.len() > 8 {
        return None;
    }
    Some(digits.iter().fold(0_u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Decodes the segment index, returning [`SEGMENT_INDEX_NONE`] instead of
/// failing when `name` is not a segment name. Indices that do not fit an
/// `i64` also yield the sentinel. Callers must not treat the sentinel as an
/// index.
pub fn segment_index(name: &Name) -> i64 {
    try_segment_index(name)
        .and_then(|index| i64::try_from(index).ok())
        .unwrap_or(SEGMENT_INDEX_NONE)
}

/// A header (when present) lives at the segment root of the stream.
pub fn header_name(name: &Name) -> Name {
    segment_root(name)
}
