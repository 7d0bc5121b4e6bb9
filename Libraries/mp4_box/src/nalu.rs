/// H.264 samples in MP4 use 4 byte big-endian NAL unit lengths (`lengthSizeMinusOne == 3`).
pub const NALU_LENGTH_SIZE: usize = 4;

/// Splits one length-prefixed video sample into its NAL units.
///
/// Every returned unit keeps its 4 byte length prefix, so the units can be handed to decoders
/// that take AVCC-formatted input as-is. A length that runs past the end of the sample, or a
/// trailing stub shorter than a length field, ends the split; the remainder is dropped.
pub fn split_nalus(sample: &[u8]) -> Vec<Vec<u8>> {
    let mut nalus = Vec::new();
    let mut offset = 0;

    while offset < sample.len() {
        let Some(prefix) = sample.get(offset..offset + NALU_LENGTH_SIZE) else {
            break;
        };
        let length = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        let end = offset + NALU_LENGTH_SIZE + length;
        let Some(nalu) = sample.get(offset..end) else {
            tracing::debug!("NALU size {} exceeds the {} bytes left in the sample", length, sample.len() - offset);
            break;
        };
        nalus.push(nalu.to_vec());
        offset = end;
    }

    nalus
}
