//! Version components.
//!
//! A version is `0xFD` followed by a fixed-width, 48-bit big-endian
//! [`CcnTime`] tick count, so byte order of version components equals
//! chronological order. A fully qualified name reads root, version, segment.

use crate::error::CoreError;
use crate::name::{Component, Name};
use crate::segmentation::segment_root;
use crate::time::CcnTime;

/// Leading byte of a version component.
pub const VERSION_MARKER: u8 = 0xFD;
/// Width of the emitted timestamp field.
pub const VERSION_TIMESTAMP_LEN: usize = 6;

const MAX_DECODED_TIMESTAMP_LEN: usize = 8;

pub fn is_version_component(component: &Component) -> bool {
    let bytes = component.as_bytes();
    bytes.len() > 1 && bytes.len() <= 1 + MAX_DECODED_TIMESTAMP_LEN && bytes[0] == VERSION_MARKER
}

/// Encodes `at` as a version component.
pub fn version_component(at: CcnTime) -> Component {
    let be = at.ticks().to_be_bytes();
    let mut out = Vec::with_capacity(1 + VERSION_TIMESTAMP_LEN);
    out.push(VERSION_MARKER);
    out.extend_from_slice(&be[be.len() - VERSION_TIMESTAMP_LEN..]);
    Component::from(out)
}

/// Decodes a version component back into its timestamp.
pub fn decode_version_component(component: &Component) -> Result<CcnTime, CoreError> {
    if !is_version_component(component) {
        return Err(CoreError::InvalidVersion);
    }
    let ticks = component.as_bytes()[1..]
        .iter()
        .fold(0_u64, |acc, b| (acc << 8) | u64::from(*b));
    Ok(CcnTime::from_ticks(ticks))
}

/// The trailing version component, looking past a segment suffix.
pub fn version_of(name: &Name) -> Option<Component> {
    segment_root(name)
        .last_component()
        .filter(|c| is_version_component(c))
        .cloned()
}

pub fn is_versioned(name: &Name) -> bool {
    version_of(name).is_some()
}

/// Appends a freshly minted version unless `name` is already versioned.
pub fn version_name(name: &Name) -> Name {
    if is_versioned(name) {
        return name.clone();
    }
    version_name_at(name, CcnTime::mint())
}

/// Appends the version for `at` unconditionally.
pub fn version_name_at(name: &Name, at: CcnTime) -> Name {
    name.child(version_component(at))
}

/// Strips the version (and any segment below it); identity for unversioned names.
pub fn version_root(name: &Name) -> Name {
    let base = segment_root(name);
    match base.last_component() {
        Some(last) if is_version_component(last) => base.cut_last(),
        _ => name.clone(),
    }
}

/// Decodes the version timestamp, failing with `VersionMissing` for unversioned names.
pub fn version_as_timestamp(name: &Name) -> Result<CcnTime, CoreError> {
    let component = version_of(name).ok_or_else(|| CoreError::VersionMissing(name.to_uri()))?;
    decode_version_component(&component)
}
