use crate::{format_capped_bytes, write_version_and_flags};

use super::generic::Mp4Box;

/// The specific configuration is everything after version/flags.
pub const SPECIFIC_CONFIG_OFFSET: usize = 4;

// The `EsdsBox` struct represents an Elementary Stream Descriptor Box.
// Its descriptor bytes are handed to the AAC decoder untouched as the specific configuration,
// the descriptor tree is not parsed.
#[derive(Clone, PartialEq, Eq)]
pub struct EsdsBox { // Elementary Stream Descriptor Box
    pub specific_config: Vec<u8>,
}

impl std::fmt::Debug for EsdsBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsdsBox")
            .field("specific_config", &format_capped_bytes(&self.specific_config))
            .finish()
    }
}

impl EsdsBox {
    pub fn read(content: &[u8]) -> Option<Self> {
        let specific_config = content.get(SPECIFIC_CONFIG_OFFSET..)?.to_vec();
        Some(EsdsBox { specific_config })
    }
}

impl Mp4Box for EsdsBox {
    fn box_type(&self) -> [u8; 4] { *b"esds" }

    fn write_content(&self, buffer: &mut Vec<u8>) {
        write_version_and_flags(buffer, 0, 0);
        buffer.extend_from_slice(&self.specific_config);
    }
}
