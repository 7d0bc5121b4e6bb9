use crate::{read_u32_be, read_u64_be, write_version_and_flags};

use super::generic::Mp4Box;

pub const BASE_DECODE_TIME_OFFSET: usize = 4;

// The `TfdtBox` struct represents a Track Fragment Decode Time Box in the MP4 file format.
// The 32-bit or 64-bit form is picked from the payload length (more than 8 bytes means 64-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfdtBox { // Track Fragment Decode Time Box
    pub version: u8,
    pub base_decode_time: u64,
}

impl TfdtBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        if content.len() > 8 {
            let base_decode_time = read_u64_be(content, BASE_DECODE_TIME_OFFSET)?;
            Some(TfdtBox { version: 1, base_decode_time })
        } else {
            let base_decode_time = read_u32_be(content, BASE_DECODE_TIME_OFFSET)? as u64;
            Some(TfdtBox { version: 0, base_decode_time })
        }
    }
}

impl Mp4Box for TfdtBox {
    fn box_type(&self) -> [u8; 4] { *b"tfdt" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, self.version, 0);
        if self.version == 0 {
            buffer.extend_from_slice(&(self.base_decode_time as u32).to_be_bytes());
        } else {
            buffer.extend_from_slice(&self.base_decode_time.to_be_bytes());
        }
    }
}
