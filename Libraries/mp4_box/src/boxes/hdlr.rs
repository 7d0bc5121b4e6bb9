use crate::{format_fourcc, write_version_and_flags};

use super::generic::Mp4Box;

/// Offset of `handler_type` in the payload (after version/flags and `pre_defined`).
pub const HANDLER_TYPE_OFFSET: usize = 8;

// The `HdlrBox` struct represents a Handler Reference Box in the MP4 file format.
// The handler type says what kind of media a track carries: `vide` for video, `soun` for audio.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HdlrBox { // Handler Reference Box
    pub handler_type: [u8; 4],
}

impl std::fmt::Debug for HdlrBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdlrBox")
            .field("handler_type", &format_fourcc(&self.handler_type))
            .finish()
    }
}

impl HdlrBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        let bytes = content.get(HANDLER_TYPE_OFFSET..HANDLER_TYPE_OFFSET + 4)?;
        Some(HdlrBox { handler_type: [bytes[0], bytes[1], bytes[2], bytes[3]] })
    }
}

impl Mp4Box for HdlrBox {
    fn box_type(&self) -> [u8; 4] { *b"hdlr" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, 0, 0);
        buffer.extend_from_slice(&0u32.to_be_bytes());  // pre_defined
        buffer.extend_from_slice(&self.handler_type);
        buffer.extend_from_slice(&[0; 12]);  // reserved
        buffer.push(0);  // empty, null-terminated name
    }
}
