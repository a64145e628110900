use tracing::debug;

use ccn_codec::{ContentObject, ContentType, SignedInfo};
use ccn_core::segmentation::{segment_component, segment_name, BASE_SEGMENT};
use ccn_core::{CcnTime, Name};
use ccn_crypto::content::sign_content;
use ccn_crypto::{Signer, SigningError};

use crate::config::LibraryConfig;

/// Turns a byte stream into signed, segment-named units.
pub struct Segmenter<'a> {
    signer: &'a dyn Signer,
    config: &'a LibraryConfig,
}

impl<'a> Segmenter<'a> {
    pub fn new(signer: &'a dyn Signer, config: &'a LibraryConfig) -> Self {
        Self { signer, config }
    }

    /// Segment indices for a payload of `len` bytes, in stream order.
    pub fn segment_indices(&self, len: usize) -> Vec<u64> {
        let mut indices = vec![BASE_SEGMENT];
        let mut offset = self.config.block_size;
        let mut index = BASE_SEGMENT;
        while offset < len {
            index = self
                .config
                .next_segment_index(index, self.config.block_size);
            indices.push(index);
            offset += self.config.block_size;
        }
        indices
    }

    /// Splits `payload` into units named `base/<segment>`. Every unit carries
    /// the final segment id; an empty or small payload is exactly one unit.
    pub fn segment(
        &self,
        base: &Name,
        payload: &[u8],
        content_type: ContentType,
    ) -> Result<Vec<ContentObject>, SigningError> {
        let indices = self.segment_indices(payload.len());
        let final_block = indices.last().copied().map(segment_component);
        let timestamp = CcnTime::now();

        let mut chunks: Vec<&[u8]> = payload.chunks(self.config.block_size).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }

        let mut units = Vec::with_capacity(chunks.len());
        for (index, chunk) in indices.into_iter().zip(chunks) {
            let mut signed_info = self.signed_info(content_type, timestamp);
            signed_info.final_block_id = final_block.clone();
            let mut unit =
                ContentObject::unsigned(segment_name(base, index), signed_info, chunk.to_vec());
            sign_content(self.signer, &mut unit)?;
            units.push(unit);
        }
        debug!(name = %base, segments = units.len(), bytes = payload.len(), "stream segmented");
        Ok(units)
    }

    /// A single empty GONE unit named exactly `name`.
    pub fn gone(&self, name: &Name) -> Result<ContentObject, SigningError> {
        let signed_info = self.signed_info(ContentType::Gone, CcnTime::now());
        let mut unit = ContentObject::unsigned(name.clone(), signed_info, Vec::new());
        sign_content(self.signer, &mut unit)?;
        Ok(unit)
    }

    fn signed_info(&self, content_type: ContentType, timestamp: CcnTime) -> SignedInfo {
        let mut info = SignedInfo::new(self.signer.publisher_key(), content_type);
        info.timestamp = timestamp;
        info.freshness_seconds = self.config.freshness_seconds;
        info
    }
}
