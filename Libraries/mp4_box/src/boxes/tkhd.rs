use crate::{read_i32_be, read_version_and_flags, write_version_and_flags};

use super::generic::Mp4Box;

/// Offset of `track_ID` in a version 0 payload (32-bit creation/modification times).
pub const TRACK_ID_OFFSET_V0: usize = 12;
/// Offset of `track_ID` in a version 1 payload (64-bit creation/modification times).
pub const TRACK_ID_OFFSET_V1: usize = 20;

// The `TkhdBox` struct represents a Track Header Box in the MP4 file format.
// Only the version and the track ID are read; the ID links the track configuration in
// `moov` to the fragments in later `moof` boxes.
//
// Fields:
// - `version`: 0 for 32-bit times, anything else for 64-bit times.
// - `track_id`: the ID, read as a big-endian signed 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TkhdBox { // Track Header Box
    pub version: u8,
    pub track_id: i32,
}

impl TkhdBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        let (version, _) = read_version_and_flags(content)?;
        let offset = if version == 0 { TRACK_ID_OFFSET_V0 } else { TRACK_ID_OFFSET_V1 };
        let track_id = read_i32_be(content, offset)?;
        Some(TkhdBox { version, track_id })
    }
}

impl Mp4Box for TkhdBox {
    fn box_type(&self) -> [u8; 4] { *b"tkhd" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, self.version, 0x000007); // enabled, in movie, in preview
        if self.version == 0 {
            buffer.extend_from_slice(&[0; 8]);  // creation + modification time
        } else {
            buffer.extend_from_slice(&[0; 16]);
        }
        buffer.extend_from_slice(&self.track_id.to_be_bytes());
        buffer.extend_from_slice(&[0; 4]);  // reserved
        if self.version == 0 {
            buffer.extend_from_slice(&[0; 4]);  // duration
        } else {
            buffer.extend_from_slice(&[0; 8]);
        }
        // reserved, layer, alternate group, volume, reserved, matrix, width, height
        buffer.extend_from_slice(&[0; 8 + 2 + 2 + 2 + 2 + 36 + 4 + 4]);
    }
}
