use crate::{format_capped_bytes, read_u16_be};

use super::generic::Mp4Box;

/// Offset of the first SPS length field: configurationVersion, profile, compatibility,
/// level, lengthSizeMinusOne and the SPS count come first, one byte each.
pub const FIRST_PARAMETER_SET_OFFSET: usize = 6;
/// Size of the PPS count field that sits between the SPS and the PPS.
pub const PPS_COUNT_SIZE: usize = 1;

// The `AvcCBox` struct represents an AVC Decoder Configuration Box (`avcC`).
// It carries the H.264 parameter sets a decoder needs before the first frame. Exactly one
// SPS followed by one PPS is read; additional parameter sets are ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct AvcCBox { // AVC Decoder Configuration Box
    pub sps: Vec<u8>,
    pub pps: Vec<u8>,
}

impl std::fmt::Debug for AvcCBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvcCBox")
            .field("sps", &format_capped_bytes(&self.sps))
            .field("pps", &format_capped_bytes(&self.pps))
            .finish()
    }
}

impl AvcCBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        let mut offset = FIRST_PARAMETER_SET_OFFSET;
        let sps = read_parameter_set(content, &mut offset)?;
        offset += PPS_COUNT_SIZE;
        let pps = read_parameter_set(content, &mut offset)?;
        Some(AvcCBox { sps, pps })
    }
}

// Reads one 2 byte length + payload pair and advances `offset` past it.
fn read_parameter_set(content: &[u8], offset: &mut usize) -> Option<Vec<u8>> {
    let length = read_u16_be(content, *offset)? as usize;
    let start = *offset + 2;
    let parameter_set = content.get(start..start + length)?.to_vec();
    *offset = start + length;
    Some(parameter_set)
}

impl Mp4Box for AvcCBox {
    fn box_type(&self) -> [u8; 4] { *b"avcC" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        buffer.push(1);  // configurationVersion
        buffer.push(self.sps.get(1).copied().unwrap_or(0x64));  // profile
        buffer.push(self.sps.get(2).copied().unwrap_or(0));  // profile compatibility
        buffer.push(self.sps.get(3).copied().unwrap_or(0x1F));  // level
        buffer.push(0xFF);  // 4 byte NAL lengths
        buffer.push(0xE1);  // one SPS
        buffer.extend_from_slice(&(self.sps.len() as u16).to_be_bytes());
        buffer.extend_from_slice(&self.sps);
        buffer.push(1);  // one PPS
        buffer.extend_from_slice(&(self.pps.len() as u16).to_be_bytes());
        buffer.extend_from_slice(&self.pps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sps_then_pps() {
        let avcc = AvcCBox {
            sps: vec![0x67, 0x64, 0x00, 0x1F, 0xAC, 0xD9],
            pps: vec![0x68, 0xEB, 0xE3, 0xCB],
        };
        let mut content = Vec::new();
        avcc.write_content(&mut content);
        assert_eq!(AvcCBox::read(&content), Some(avcc));
    }

    #[test]
    fn truncated_pps_is_rejected() {
        let avcc = AvcCBox { sps: vec![0x67; 10], pps: vec![0x68; 4] };
        let mut content = Vec::new();
        avcc.write_content(&mut content);
        content.truncate(content.len() - 1);
        assert!(AvcCBox::read(&content).is_none());
    }
}
