use crate::write_version_and_flags;

use super::generic::Mp4Box;

/// Payloads longer than this read the track ID byte at [`TRACK_ID_LONG_OFFSET`].
pub const LONG_LAYOUT_THRESHOLD: usize = 16;
pub const TRACK_ID_LONG_OFFSET: usize = 16;
/// Low byte of `track_ID` in the minimal layout (version/flags + track_ID).
pub const TRACK_ID_SHORT_OFFSET: usize = 7;

// The `TfhdBox` struct represents a Track Fragment Header Box in the MP4 file format.
// The track ID is recovered with a length heuristic instead of decoding the flags: a single
// byte is read at offset 16 when the payload is longer than 16 bytes, otherwise at offset 7.
// This matches the packagers this demuxer is fed by and keeps IDs below 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfhdBox { // Track Fragment Header Box
    pub track_id: i32,
}

impl TfhdBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        let offset = if content.len() > LONG_LAYOUT_THRESHOLD {
            TRACK_ID_LONG_OFFSET
        } else {
            TRACK_ID_SHORT_OFFSET
        };
        content.get(offset).map(|&byte| TfhdBox { track_id: byte as i32 })
    }
}

impl Mp4Box for TfhdBox {
    fn box_type(&self) -> [u8; 4] { *b"tfhd" }

    // Writes the minimal layout: no optional fields, so the ID lands at the short offset.
    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, 0, 0);
        buffer.extend_from_slice(&(self.track_id as u32).to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_layout_reads_low_byte_of_track_id() {
        let mut content = Vec::new();
        TfhdBox { track_id: 2 }.write_content(&mut content);
        assert_eq!(content.len(), 8);
        assert_eq!(TfhdBox::read(&content), Some(TfhdBox { track_id: 2 }));
    }

    #[test]
    fn long_layout_reads_byte_sixteen() {
        let mut content = vec![0u8; 20];
        content[7] = 9;
        content[16] = 1;
        assert_eq!(TfhdBox::read(&content).unwrap().track_id, 1);

        content.truncate(16);
        assert_eq!(TfhdBox::read(&content).unwrap().track_id, 9);
    }

    #[test]
    fn too_short_payload_has_no_track() {
        assert!(TfhdBox::read(&[0, 0, 0, 0]).is_none());
    }
}
